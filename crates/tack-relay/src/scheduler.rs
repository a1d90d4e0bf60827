//! Outbox delivery pacing.
//!
//! Queued WiFi posts go out one at a time on a four-rung backoff ladder:
//! the first send after a quiet spell is immediate, and each send stretches
//! the gap before the next so a burst of posts cannot saturate shared
//! airtime. A long idle gap drops the ladder back to immediate.

use std::time::{Duration, Instant};

use tack_core::{
  channel::ChannelMap,
  config::Limits,
  outbox::OutboxEntry,
  radio::RadioLink,
  store::BoardStore,
};

/// Poll interval while the outbox is empty.
pub const IDLE_POLL: Duration = Duration::from_secs(1);

// ─── BackoffLadder ───────────────────────────────────────────────────────────

/// Send pacing state: the current rung and the time of the last attempt.
///
/// Rungs are `[0, 2s, 5s, max_delay]`. Every attempt climbs one rung
/// (capped) whether it delivered or not; failures must not retry faster
/// than successes send.
#[derive(Debug, Clone)]
pub struct BackoffLadder {
  delays:     [Duration; 4],
  idle_reset: Duration,
  level:      usize,
  last_send:  Option<Instant>,
}

impl BackoffLadder {
  pub fn new(max_delay: Duration, idle_reset: Duration) -> Self {
    Self {
      delays:     [
        Duration::ZERO,
        Duration::from_secs(2),
        Duration::from_secs(5),
        max_delay,
      ],
      idle_reset,
      level:      0,
      last_send:  None,
    }
  }

  /// How much longer the next attempt must wait. Zero means ready. An idle
  /// gap longer than the reset threshold drops back to rung zero first.
  pub fn required_wait(&mut self, now: Instant) -> Duration {
    let Some(last) = self.last_send else {
      return Duration::ZERO;
    };
    let elapsed = now.duration_since(last);
    if elapsed > self.idle_reset {
      self.level = 0;
    }
    self.delays[self.level].saturating_sub(elapsed)
  }

  /// Note a completed attempt: climb one rung (capped) and stamp the clock.
  pub fn advance(&mut self, now: Instant) {
    self.level = (self.level + 1).min(self.delays.len() - 1);
    self.last_send = Some(now);
  }

  pub fn level(&self) -> usize {
    self.level
  }
}

// ─── Scheduler loop ──────────────────────────────────────────────────────────

/// Drive the outbox forever. Store errors are logged and retried after a
/// short sleep; they never kill the loop.
pub async fn run<S, L>(store: S, link: L, channels: ChannelMap, limits: Limits)
where
  S: BoardStore,
  L: RadioLink,
{
  let mut ladder = BackoffLadder::new(
    Duration::from_secs(limits.outbox_max_delay_sec),
    Duration::from_secs(limits.outbox_idle_reset_sec),
  );

  tracing::info!(
    max_delay_sec = limits.outbox_max_delay_sec,
    idle_reset_sec = limits.outbox_idle_reset_sec,
    "outbox scheduler running"
  );

  loop {
    let entry = match store.oldest_pending_outbox().await {
      Ok(Some(entry)) => entry,
      Ok(None) => {
        // Empty queue leaves the ladder untouched.
        tokio::time::sleep(IDLE_POLL).await;
        continue;
      }
      Err(err) => {
        tracing::warn!(error = %err, "outbox poll failed");
        tokio::time::sleep(IDLE_POLL).await;
        continue;
      }
    };

    let wait = ladder.required_wait(Instant::now());
    if !wait.is_zero() {
      // Re-fetch after the wait; the entry may have been canceled meanwhile.
      tokio::time::sleep(wait).await;
      continue;
    }

    deliver(&store, &link, &channels, &entry).await;
    ladder.advance(Instant::now());
  }
}

/// One delivery attempt for the popped entry. Any failure leaves the entry
/// pending; the ladder paces the retry.
pub async fn deliver<S, L>(
  store: &S,
  link: &L,
  channels: &ChannelMap,
  entry: &OutboxEntry,
) where
  S: BoardStore,
  L: RadioLink,
{
  let Some(idx) = channels.mesh_index(&entry.channel) else {
    tracing::warn!(
      id = entry.id,
      channel = %entry.channel,
      "outbox entry for unknown mesh channel"
    );
    return;
  };

  if let Err(err) = link.send_channel_message(idx, &entry.content).await {
    tracing::warn!(
      id = entry.id,
      channel = %entry.channel,
      error = %err,
      "outbox send failed"
    );
    return;
  }

  // Record the message before flipping `sent`; a failure between the two
  // re-delivers the entry next cycle.
  match store.insert_message(entry.as_relayed()).await {
    Ok(message) => {
      tracing::info!(
        id = entry.id,
        message_id = message.id,
        channel = %entry.channel,
        "outbox entry relayed"
      );
    }
    Err(err) => {
      tracing::warn!(id = entry.id, error = %err, "failed to record relayed message");
      return;
    }
  }

  if let Err(err) = store.mark_outbox_sent(entry.id).await {
    tracing::warn!(id = entry.id, error = %err, "failed to mark outbox entry sent");
  }
}
