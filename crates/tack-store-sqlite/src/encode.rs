//! Encoding and decoding helpers between domain types and SQLite column
//! values.
//!
//! All timestamps are unix epoch seconds in INTEGER columns. Enumerations
//! (`source`, `vote_type`) use the encodings the domain types define, since
//! the column values are shared with existing hub databases.

use chrono::{DateTime, Utc};
use tack_core::{
  message::{Message, Source},
  outbox::OutboxEntry,
  session::Session,
  status::HubStatus,
  vote::VoteKind,
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(ts: DateTime<Utc>) -> i64 {
  ts.timestamp()
}

pub fn decode_ts(secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0).ok_or(Error::Timestamp(secs))
}

pub fn decode_ts_opt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>> {
  secs.map(decode_ts).transpose()
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn decode_source(s: &str) -> Result<Source> {
  Ok(Source::parse(s)?)
}

pub fn decode_vote(v: i64) -> Result<VoteKind> {
  Ok(VoteKind::from_signed(v)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `messages` row. Counter and flag columns
/// are nullable in old databases, so they decode through `Option`.
pub struct MessageRow {
  pub id:          i64,
  pub ts:          i64,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub source:      String,
  pub session_id:  Option<String>,
  pub fingerprint: Option<String>,
  pub upvotes:     Option<i64>,
  pub downvotes:   Option<i64>,
  pub pinned:      Option<i64>,
  pub pin_order:   Option<i64>,
}

impl MessageRow {
  pub const COLUMNS: &'static str = "id, ts, channel, sender, content, \
     source, session_id, fingerprint, upvotes, downvotes, pinned, pin_order";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      ts:          row.get(1)?,
      channel:     row.get(2)?,
      sender:      row.get(3)?,
      content:     row.get(4)?,
      source:      row.get(5)?,
      session_id:  row.get(6)?,
      fingerprint: row.get(7)?,
      upvotes:     row.get(8)?,
      downvotes:   row.get(9)?,
      pinned:      row.get(10)?,
      pin_order:   row.get(11)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:          self.id,
      ts:          decode_ts(self.ts)?,
      channel:     self.channel,
      sender:      self.sender,
      content:     self.content,
      source:      decode_source(&self.source)?,
      session_id:  self.session_id,
      fingerprint: self.fingerprint,
      upvotes:     self.upvotes.unwrap_or(0),
      downvotes:   self.downvotes.unwrap_or(0),
      pinned:      self.pinned.unwrap_or(0) != 0,
      pin_order:   self.pin_order,
    })
  }
}

/// Raw values read directly from an `outbox` row.
pub struct OutboxRow {
  pub id:          i64,
  pub ts:          i64,
  pub channel:     String,
  pub sender:      String,
  pub content:     String,
  pub session_id:  String,
  pub fingerprint: Option<String>,
  pub sent:        Option<i64>,
}

impl OutboxRow {
  pub const COLUMNS: &'static str =
    "id, ts, channel, sender, content, session_id, fingerprint, sent";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      ts:          row.get(1)?,
      channel:     row.get(2)?,
      sender:      row.get(3)?,
      content:     row.get(4)?,
      session_id:  row.get(5)?,
      fingerprint: row.get(6)?,
      sent:        row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<OutboxEntry> {
    Ok(OutboxEntry {
      id:          self.id,
      ts:          decode_ts(self.ts)?,
      channel:     self.channel,
      sender:      self.sender,
      content:     self.content,
      session_id:  self.session_id,
      fingerprint: self.fingerprint,
      sent:        self.sent.unwrap_or(0) != 0,
    })
  }
}

/// Raw values read directly from a `sessions` row. Every column except the
/// key is nullable in the table, so legacy rows decode leniently.
pub struct SessionRow {
  pub session_id:      String,
  pub name:            Option<String>,
  pub location:        Option<String>,
  pub mac_address:     Option<String>,
  pub fingerprint:     Option<String>,
  pub created_ts:      Option<i64>,
  pub last_post_ts:    Option<i64>,
  pub post_count_hour: Option<i64>,
}

impl SessionRow {
  pub const COLUMNS: &'static str = "session_id, name, location, \
     mac_address, fingerprint, created_ts, last_post_ts, post_count_hour";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:      row.get(0)?,
      name:            row.get(1)?,
      location:        row.get(2)?,
      mac_address:     row.get(3)?,
      fingerprint:     row.get(4)?,
      created_ts:      row.get(5)?,
      last_post_ts:    row.get(6)?,
      post_count_hour: row.get(7)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:      self.session_id,
      name:            self.name.unwrap_or_default(),
      location:        self.location.unwrap_or_default(),
      mac_address:     self.mac_address,
      fingerprint:     self.fingerprint,
      created_ts:      decode_ts(self.created_ts.unwrap_or(0))?,
      last_post_ts:    decode_ts_opt(self.last_post_ts)?,
      post_count_hour: self.post_count_hour.unwrap_or(0),
    })
  }
}

/// Raw values read directly from a `status` row.
pub struct StatusRow {
  pub process:         String,
  pub radio_connected: i64,
  pub last_seen_ts:    i64,
}

impl StatusRow {
  pub const COLUMNS: &'static str = "process, radio_connected, last_seen_ts";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      process:         row.get(0)?,
      radio_connected: row.get(1)?,
      last_seen_ts:    row.get(2)?,
    })
  }

  pub fn into_status(self) -> Result<HubStatus> {
    Ok(HubStatus {
      process:         self.process,
      radio_connected: self.radio_connected != 0,
      last_seen_ts:    decode_ts(self.last_seen_ts)?,
    })
  }
}
