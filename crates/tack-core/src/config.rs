//! Hub configuration schema shared by every binary.
//!
//! One TOML file drives both the relay daemon and the admin tool, so the two
//! processes always agree on the channel lists and limits.

use serde::Deserialize;

use crate::channel::ChannelMap;

/// The posting rate window. The stored counter approximates this window; it
/// is not configurable because every reader of `post_count_hour` assumes it.
pub const RATE_WINDOW_SECS: i64 = 3600;

// ─── HubConfig ───────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
  pub db_path:  String,
  pub hub:      HubInfo,
  pub radio:    RadioSettings,
  pub channels: MeshChannels,
  pub local:    LocalChannels,
  pub limits:   Limits,
}

impl Default for HubConfig {
  fn default() -> Self {
    Self {
      db_path:  "tack.db".to_owned(),
      hub:      HubInfo::default(),
      radio:    RadioSettings::default(),
      channels: MeshChannels::default(),
      local:    LocalChannels::default(),
      limits:   Limits::default(),
    }
  }
}

impl HubConfig {
  pub fn channel_map(&self) -> ChannelMap {
    ChannelMap::new(self.channels.names.clone(), self.local.names.clone())
  }
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// Operator-facing identity of this hub.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubInfo {
  pub name:     String,
  /// Free-text location, recorded on sessions as their default location.
  pub location: String,
}

impl Default for HubInfo {
  fn default() -> Self {
    Self { name: "Tack Hub".to_owned(), location: String::new() }
  }
}

/// Physical radio parameters handed to the link driver at connect time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
  pub serial_port: String,
  pub freq_mhz:    f64,
  pub bw_khz:      f64,
  /// Spreading factor.
  pub sf:          u8,
  /// Coding rate.
  pub cr:          u8,
}

impl Default for RadioSettings {
  fn default() -> Self {
    Self {
      serial_port: "/dev/ttyUSB0".to_owned(),
      freq_mhz:    910.525,
      bw_khz:      62.5,
      sf:          7,
      cr:          5,
    }
  }
}

/// Mesh channel list. Order is radio identity: slot N on the air is position
/// N here, so renaming or reordering changes which traffic lands where.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshChannels {
  pub names: Vec<String>,
}

/// WiFi-only channel list.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalChannels {
  pub names: Vec<String>,
}

impl Default for LocalChannels {
  fn default() -> Self {
    Self { names: vec!["#local".to_owned()] }
  }
}

/// Posting limits and storage budgets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
  pub posts_per_hour:              i64,
  pub message_max_chars:           usize,
  pub name_max_chars:              usize,
  /// Top rung of the outbox backoff ladder, in seconds.
  pub outbox_max_delay_sec:        u64,
  /// Idle time after which the ladder drops back to immediate sends. Must
  /// exceed `outbox_max_delay_sec` or the top rung is unreachable.
  pub outbox_idle_reset_sec:       u64,
  pub retention_bytes_per_channel: u64,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      posts_per_hour:              10,
      message_max_chars:           200,
      name_max_chars:              10,
      outbox_max_delay_sec:        30,
      outbox_idle_reset_sec:       120,
      retention_bytes_per_channel: 10 * 1024 * 1024 * 1024,
    }
  }
}
