//! Hourly retention sweeps.

use std::time::Duration;

use tack_core::{channel::ChannelMap, store::BoardStore};

pub const RETENTION_INTERVAL: Duration = Duration::from_secs(3600);

/// Sweep every channel once per interval, starting immediately.
pub async fn run<S: BoardStore>(store: S, channels: ChannelMap, max_bytes: u64) {
  let mut ticker = tokio::time::interval(RETENTION_INTERVAL);
  loop {
    ticker.tick().await;
    pass(&store, &channels, max_bytes).await;
  }
}

/// One sweep over every channel the hub carries. Per-channel failures are
/// logged and do not stop the sweep.
pub async fn pass<S: BoardStore>(store: &S, channels: &ChannelMap, max_bytes: u64) {
  for channel in channels.all() {
    match store.evict_channel(channel, max_bytes).await {
      Ok(0) => {}
      Ok(deleted) => {
        tracing::info!(channel, deleted, "retention evicted messages");
      }
      Err(err) => {
        tracing::warn!(channel, error = %err, "retention eviction failed");
      }
    }
  }
}
