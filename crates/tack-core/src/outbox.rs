//! Outbox types — WiFi posts waiting for airtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{NewMessage, Source};

// ─── OutboxEntry ─────────────────────────────────────────────────────────────

/// A queued post awaiting relay onto the mesh.
///
/// Rows are immutable except for `sent`, which flips to `true` exactly once
/// and is never unset. Only operator cancel/clear deletes entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
  pub id:          i64,
  /// Submission time. Delivery is oldest-first, with insertion order
  /// breaking ties.
  pub ts:          DateTime<Utc>,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub session_id:  String,
  pub fingerprint: Option<String>,
  pub sent:        bool,
}

impl OutboxEntry {
  /// The message this entry becomes once it has been put on the air: same
  /// author timestamp, recorded as having arrived over WiFi.
  pub fn as_relayed(&self) -> NewMessage {
    NewMessage {
      ts:          self.ts,
      channel:     self.channel.clone(),
      sender:      self.sender.clone(),
      content:     self.content.clone(),
      source:      Source::Wifi,
      session_id:  Some(self.session_id.clone()),
      fingerprint: self.fingerprint.clone(),
    }
  }
}

// ─── NewOutboxEntry ──────────────────────────────────────────────────────────

/// Input to [`crate::store::BoardStore::queue_outbox`].
#[derive(Debug, Clone)]
pub struct NewOutboxEntry {
  pub ts:          DateTime<Utc>,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub session_id:  String,
  pub fingerprint: Option<String>,
}
