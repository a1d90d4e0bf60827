//! Fixed-width table rendering for operator output.
//!
//! Columns are padded with spaces and long values are truncated with an
//! ellipsis; the last column of each table is left unpadded.

use chrono::{DateTime, Local, Utc};
use tack_core::{message::Message, outbox::OutboxEntry, session::Session};

pub const ID_W: usize = 6;
pub const TS_W: usize = 19;
pub const SHORT_TS_W: usize = 16;
pub const CHANNEL_W: usize = 12;
pub const SOURCE_W: usize = 5;
pub const SENDER_W: usize = 16;
pub const CONTENT_W: usize = 40;
pub const NAME_W: usize = 12;
pub const LOCATION_W: usize = 12;
pub const MAC_W: usize = 17;

/// Truncate to `width` characters, ellipsis included. Counts characters, not
/// bytes, so multibyte names never split mid-character.
pub fn truncate(value: &str, width: usize) -> String {
  if value.chars().count() <= width {
    return value.to_owned();
  }
  let kept: String = value.chars().take(width.saturating_sub(3)).collect();
  format!("{kept}...")
}

/// Local wall-clock timestamp, seconds precision.
pub fn ts(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Local wall-clock timestamp, minutes precision.
pub fn short_ts(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

// ─── Outbox table ────────────────────────────────────────────────────────────

pub fn outbox_header() -> String {
  format!(
    "{:<ID_W$} {:<TS_W$} {:<CHANNEL_W$} {:<SENDER_W$} CONTENT",
    "ID", "TS", "CH", "SENDER"
  )
}

pub fn outbox_row(entry: &OutboxEntry) -> String {
  format!(
    "{:<ID_W$} {:<TS_W$} {:<CHANNEL_W$} {:<SENDER_W$} {}",
    entry.id,
    ts(entry.ts),
    truncate(&entry.channel, CHANNEL_W),
    truncate(&entry.sender, SENDER_W),
    truncate(&entry.content, CONTENT_W),
  )
}

// ─── Recent-messages table ───────────────────────────────────────────────────

pub fn recent_header() -> String {
  format!(
    "{:<ID_W$} {:<TS_W$} {:<CHANNEL_W$} {:<SOURCE_W$} {:<SENDER_W$} CONTENT",
    "ID", "TS", "CH", "SRC", "SENDER"
  )
}

pub fn recent_row(message: &Message) -> String {
  format!(
    "{:<ID_W$} {:<TS_W$} {:<CHANNEL_W$} {:<SOURCE_W$} {:<SENDER_W$} {}",
    message.id,
    ts(message.ts),
    truncate(&message.channel, CHANNEL_W),
    message.source.as_str(),
    truncate(&message.sender, SENDER_W),
    truncate(&message.content, CONTENT_W),
  )
}

// ─── Sessions table ──────────────────────────────────────────────────────────

/// Width of the session-id column: the longest id on the page, at minimum
/// the header label.
pub fn session_id_width<'a>(ids: impl Iterator<Item = &'a str>) -> usize {
  ids
    .map(|id| id.chars().count())
    .max()
    .unwrap_or(0)
    .max("SESSION".len())
}

pub fn sessions_header(id_width: usize) -> String {
  format!(
    "{:<id_width$} {:<SHORT_TS_W$} {:<NAME_W$} {:<LOCATION_W$} {:<MAC_W$} POSTS",
    "SESSION", "LAST", "NAME", "LOC", "MAC"
  )
}

pub fn session_row(session: &Session, id_width: usize) -> String {
  let last = match session.last_post_ts {
    Some(ts) => short_ts(ts),
    None => "-".to_owned(),
  };
  format!(
    "{:<id_width$} {:<SHORT_TS_W$} {:<NAME_W$} {:<LOCATION_W$} {:<MAC_W$} {}",
    session.session_id,
    last,
    truncate(or_dash(&session.name), NAME_W),
    truncate(or_dash(&session.location), LOCATION_W),
    truncate(session.mac_address.as_deref().unwrap_or("-"), MAC_W),
    session.post_count_hour,
  )
}

fn or_dash(value: &str) -> &str {
  if value.is_empty() { "-" } else { value }
}
