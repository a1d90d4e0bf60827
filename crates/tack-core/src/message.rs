//! Message types — the unit of content on the board.
//!
//! Messages are append-mostly: after insertion only the pin fields and the
//! denormalised vote tallies ever change, and only retention eviction deletes
//! rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Source ──────────────────────────────────────────────────────────────────

/// How a message entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
  /// Heard over the radio mesh.
  Mesh,
  /// Posted over WiFi and relayed out through the outbox.
  Wifi,
  /// Posted over WiFi to an on-site-only channel; never touches the radio.
  Local,
}

impl Source {
  /// The string stored in the `source` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Mesh => "mesh",
      Self::Wifi => "wifi",
      Self::Local => "local",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "mesh" => Ok(Self::Mesh),
      "wifi" => Ok(Self::Wifi),
      "local" => Ok(Self::Local),
      other => Err(Error::UnknownSource(other.to_owned())),
    }
  }
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// A bulletin-board message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub id:          i64,
  /// When the message was authored. For relayed WiFi posts this is the
  /// original submission time, not the send time.
  pub ts:          DateTime<Utc>,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub source:      Source,
  /// The posting session, for messages that originated on this hub.
  pub session_id:  Option<String>,
  pub fingerprint: Option<String>,
  /// Denormalised tallies; recounted by the store on every vote change.
  pub upvotes:     i64,
  pub downvotes:   i64,
  pub pinned:      bool,
  /// Present iff `pinned`. Ascending display order; gaps are harmless.
  pub pin_order:   Option<i64>,
}

// ─── NewMessage ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::BoardStore::insert_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub ts:          DateTime<Utc>,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub source:      Source,
  pub session_id:  Option<String>,
  pub fingerprint: Option<String>,
}
