//! Process liveness — how the portal side learns whether the radio is up.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a heartbeat row stays fresh.
pub const STATUS_FRESH_SECS: i64 = 30;

/// The process name the relay daemon heartbeats under.
pub const RELAY_PROCESS: &str = "relay";

// ─── HubStatus ───────────────────────────────────────────────────────────────

/// The heartbeat row a background process upserts while it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubStatus {
  pub process:         String,
  pub radio_connected: bool,
  pub last_seen_ts:    DateTime<Utc>,
}

// ─── RadioStatus ─────────────────────────────────────────────────────────────

/// What clients should display for the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioStatus {
  Online,
  Offline,
  /// No heartbeat row exists; the radio process has never reported.
  Unknown,
}

impl RadioStatus {
  /// Derive the display status from a heartbeat row, if any.
  ///
  /// Online requires both the connected flag and a heartbeat no older than
  /// [`STATUS_FRESH_SECS`]; a stale row counts as offline whatever its flag
  /// says.
  pub fn from_heartbeat(row: Option<&HubStatus>, now: DateTime<Utc>) -> Self {
    let Some(status) = row else {
      return Self::Unknown;
    };
    let fresh =
      now - status.last_seen_ts <= Duration::seconds(STATUS_FRESH_SECS);
    if status.radio_connected && fresh {
      Self::Online
    } else {
      Self::Offline
    }
  }
}
