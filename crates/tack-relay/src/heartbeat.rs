//! Liveness heartbeat for the status surface.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tack_core::{status::RELAY_PROCESS, store::BoardStore};

use crate::link::RadioHealth;

/// How often the heartbeat row is refreshed. Readers treat rows older than
/// [`tack_core::status::STATUS_FRESH_SECS`] as stale, so this must stay
/// comfortably under that.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

pub async fn run<S: BoardStore>(store: S, health: RadioHealth) {
  let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
  loop {
    ticker.tick().await;
    beat(&store, health.is_connected(), Utc::now()).await;
  }
}

/// Write one heartbeat row. Failures are logged; the next tick retries.
pub async fn beat<S: BoardStore>(store: &S, connected: bool, now: DateTime<Utc>) {
  if let Err(err) = store.set_status(RELAY_PROCESS, connected, now).await {
    tracing::warn!(error = %err, "heartbeat write failed");
  }
}
