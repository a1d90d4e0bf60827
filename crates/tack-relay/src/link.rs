//! Mesh link supervision.
//!
//! The supervisor owns the connect/reconnect cycle, programs channel slots,
//! and consumes inbound traffic: channel messages land in the store as
//! `source=mesh`, direct messages are answered as search queries. Link
//! liveness is shared with the heartbeat task through [`RadioHealth`].

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tack_core::{
  channel::ChannelMap,
  message::{NewMessage, Source},
  radio::{CHANNEL_SECRET_LEN, LinkResult, RadioEvent, RadioLink},
  store::{BoardStore, SearchQuery},
};

pub const CONNECT_BACKOFF_START: Duration = Duration::from_secs(1);
pub const CONNECT_BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Matches returned for one direct-message search.
pub const SEARCH_RESULT_LIMIT: usize = 5;

const SEARCH_USAGE: &str = "Usage: search [#channel] [sender:name] keyword";

// ─── RadioHealth ─────────────────────────────────────────────────────────────

/// Shared link-liveness flag, written by the supervisor and read by the
/// heartbeat task.
#[derive(Debug, Clone, Default)]
pub struct RadioHealth(Arc<AtomicBool>);

impl RadioHealth {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_connected(&self, connected: bool) {
    self.0.store(connected, Ordering::Relaxed);
  }

  pub fn is_connected(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

// ─── Secrets ─────────────────────────────────────────────────────────────────

/// A mesh channel's shared secret: the first half of `SHA-256(name)`. Every
/// hub derives the same bytes from its channel list.
pub fn channel_secret(name: &str) -> [u8; CHANNEL_SECRET_LEN] {
  let digest = Sha256::digest(name.as_bytes());
  let mut secret = [0u8; CHANNEL_SECRET_LEN];
  secret.copy_from_slice(&digest[..CHANNEL_SECRET_LEN]);
  secret
}

// ─── Supervisor ──────────────────────────────────────────────────────────────

/// Run the link: connect with exponential backoff, program channel slots,
/// then consume inbound events until the link drops, and start over.
pub async fn run<S, L>(store: S, link: L, channels: ChannelMap, health: RadioHealth)
where
  S: BoardStore,
  L: RadioLink,
{
  let mut backoff = CONNECT_BACKOFF_START;
  loop {
    match bring_up(&link, &channels).await {
      Ok(()) => {
        backoff = CONNECT_BACKOFF_START;
        health.set_connected(true);
        tracing::info!(channels = channels.mesh().len(), "radio link up");

        pump(&store, &link, &channels).await;

        health.set_connected(false);
        tracing::warn!("radio link lost");
        // Brief pause so a flapping driver cannot spin this loop hot.
        tokio::time::sleep(CONNECT_BACKOFF_START).await;
      }
      Err(err) => {
        tracing::warn!(
          error = %err,
          retry_in_secs = backoff.as_secs(),
          "radio connect failed"
        );
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(CONNECT_BACKOFF_CAP);
      }
    }
  }
}

/// Connect and program every configured mesh slot. Slot failures are logged
/// and skipped; only a failed connect aborts.
pub(crate) async fn bring_up<L: RadioLink>(
  link: &L,
  channels: &ChannelMap,
) -> LinkResult<()> {
  link.connect().await?;
  for (idx, name) in channels.mesh().iter().enumerate() {
    match link.set_channel(idx, name, channel_secret(name)).await {
      Ok(()) => tracing::info!(idx, channel = %name, "channel slot programmed"),
      Err(err) => {
        tracing::warn!(idx, channel = %name, error = %err, "channel slot setup failed");
      }
    }
  }
  Ok(())
}

async fn pump<S, L>(store: &S, link: &L, channels: &ChannelMap)
where
  S: BoardStore,
  L: RadioLink,
{
  while let Some(event) = link.recv().await {
    handle_event(store, link, channels, event, Utc::now()).await;
  }
}

// ─── Inbound events ──────────────────────────────────────────────────────────

/// Apply one inbound event. Never fails: bad events are logged and dropped.
pub async fn handle_event<S, L>(
  store: &S,
  link: &L,
  channels: &ChannelMap,
  event: RadioEvent,
  now: DateTime<Utc>,
) where
  S: BoardStore,
  L: RadioLink,
{
  match event {
    RadioEvent::ChannelMessage { channel_idx, sender, text } => {
      let channel = channels.name_for_slot(channel_idx);
      let message = NewMessage {
        ts:          now,
        channel:     channel.clone(),
        sender,
        content:     text,
        source:      Source::Mesh,
        session_id:  None,
        fingerprint: None,
      };
      match store.insert_message(message).await {
        Ok(stored) => {
          tracing::info!(id = stored.id, channel = %channel, "mesh message stored");
        }
        Err(err) => {
          tracing::warn!(channel = %channel, error = %err, "failed to store mesh message");
        }
      }
    }
    RadioEvent::DirectMessage { sender, text } => {
      let reply = match search_reply(store, &text).await {
        Ok(reply) => reply,
        Err(err) => {
          tracing::warn!(from = %sender, error = %err, "direct message search failed");
          return;
        }
      };
      if let Err(err) = link.send_direct_message(&sender, &reply).await {
        tracing::warn!(dest = %sender, error = %err, "direct reply failed");
      }
    }
  }
}

// ─── Search queries ──────────────────────────────────────────────────────────

/// Parse a direct-message search command.
///
/// Grammar: `search [#channel] [sender:name] keyword...`. The leading word
/// must be `search` (any case). The first `#` token picks the channel and
/// the first `sender:` token picks the sender; later ones are plain
/// keywords. Returns `None` when the text is not a search command at all.
pub fn parse_search(text: &str) -> Option<SearchQuery> {
  let mut tokens = text.split_whitespace();
  if !tokens.next()?.eq_ignore_ascii_case("search") {
    return None;
  }

  let mut channel = None;
  let mut sender = None;
  let mut keywords: Vec<&str> = Vec::new();
  for token in tokens {
    if channel.is_none() && token.starts_with('#') {
      channel = Some(token.to_owned());
    } else if sender.is_none()
      && let Some(prefix) = token.get(..7)
      && prefix.eq_ignore_ascii_case("sender:")
    {
      sender = Some(token[7..].to_owned());
    } else {
      keywords.push(token);
    }
  }

  Some(SearchQuery {
    text: keywords.join(" "),
    channel,
    sender,
    limit: Some(SEARCH_RESULT_LIMIT),
  })
}

/// Build the reply for a direct message: usage for anything that is not a
/// search command, otherwise up to [`SEARCH_RESULT_LIMIT`] matches, newest
/// first, timestamped in raw epoch seconds.
pub async fn search_reply<S: BoardStore>(
  store: &S,
  text: &str,
) -> Result<String, S::Error> {
  let Some(query) = parse_search(text) else {
    return Ok(SEARCH_USAGE.to_owned());
  };

  let hits = store.search_messages(&query).await?;
  if hits.is_empty() {
    return Ok("No results.".to_owned());
  }

  let lines: Vec<String> = hits
    .iter()
    .map(|m| format!("{} {} {}: {}", m.channel, m.sender, m.ts.timestamp(), m.content))
    .collect();
  Ok(format!("Results:\n{}", lines.join("\n")))
}
