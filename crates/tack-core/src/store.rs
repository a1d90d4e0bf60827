//! The `BoardStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `tack-store-sqlite`).
//! Higher layers (the ingest API, the relay daemon, the admin tool) depend on
//! this abstraction, not on any concrete backend.

use std::{fmt, future::Future};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
  message::{Message, NewMessage, Source},
  outbox::{NewOutboxEntry, OutboxEntry},
  session::{Session, SessionIdentity},
  status::HubStatus,
  vote::{VoteChoice, VoteCounts, VoteKind},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// A page request for [`BoardStore::list_messages`].
#[derive(Debug, Clone, Copy)]
pub struct FeedPage {
  pub limit:          usize,
  pub offset:         usize,
  /// When set, pinned messages are prepended to the first page regardless of
  /// `limit`.
  pub include_pinned: bool,
}

impl Default for FeedPage {
  fn default() -> Self {
    Self { limit: 50, offset: 0, include_pinned: true }
  }
}

/// Parameters for [`BoardStore::search_messages`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Substring matched against message content.
  pub text:    String,
  pub channel: Option<String>,
  /// Substring matched against sender names.
  pub sender:  Option<String>,
  pub limit:   Option<usize>,
}

/// Filters for [`BoardStore::recent_messages`].
#[derive(Debug, Clone, Default)]
pub struct RecentFilter {
  pub channel: Option<String>,
  pub source:  Option<Source>,
  pub limit:   Option<usize>,
}

/// Aggregate row counts for the operator `stats` surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
  pub messages:       i64,
  pub sessions:       i64,
  pub outbox_pending: i64,
  pub votes:          i64,
}

impl fmt::Display for StoreCounts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "messages={} sessions={} outbox_pending={} votes={}",
      self.messages, self.sessions, self.outbox_pending, self.votes
    )
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the bulletin-board store.
///
/// Every method is a single atomic unit against the backing database:
/// concurrent readers never observe a half-applied operation, and two
/// processes may share one store file. Methods that depend on the clock take
/// `now` explicitly so callers (and tests) control time.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tasks in multi-threaded async runtimes.
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Persist a message and return it with its assigned id.
  fn insert_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  fn get_message(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Channel feed: pinned messages first in pin order, then a page of
  /// unpinned messages newest-first.
  fn list_messages<'a>(
    &'a self,
    channel: &'a str,
    page: FeedPage,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  /// Bounded substring search, newest first.
  fn search_messages<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  /// Operator view across channels and sources, newest first.
  fn recent_messages<'a>(
    &'a self,
    filter: &'a RecentFilter,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  // ── Pins ──────────────────────────────────────────────────────────────

  /// Pin a message. With no explicit order it lands after the current
  /// highest pin order; orders are never re-densified, so gaps persist.
  fn pin_message(
    &self,
    id: i64,
    order: Option<i64>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn unpin_message(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Outbox ────────────────────────────────────────────────────────────

  fn queue_outbox(
    &self,
    input: NewOutboxEntry,
  ) -> impl Future<Output = Result<OutboxEntry, Self::Error>> + Send + '_;

  /// The single oldest pending entry, if any. The relay scheduler pops
  /// exactly one per wake.
  fn oldest_pending_outbox(
    &self,
  ) -> impl Future<Output = Result<Option<OutboxEntry>, Self::Error>> + Send + '_;

  /// Pending entries for one channel, newest first (the feed overlay).
  fn pending_outbox_for_channel<'a>(
    &'a self,
    channel: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<OutboxEntry>, Self::Error>> + Send + 'a;

  /// Pending entries oldest-first, optionally restricted to one channel
  /// (the operator view).
  fn pending_outbox<'a>(
    &'a self,
    channel: Option<&'a str>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<OutboxEntry>, Self::Error>> + Send + 'a;

  fn outbox_entry(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<OutboxEntry>, Self::Error>> + Send + '_;

  /// Flip an entry's `sent` flag. Idempotent, and never unset.
  fn mark_outbox_sent(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete one pending entry. Returns `false` if it was missing or already
  /// sent.
  fn cancel_outbox(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every pending entry, returning how many went away.
  fn clear_outbox(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Set, change, or withdraw one session's vote, then recount the
  /// message's tallies in the same atomic unit. Returns the fresh tallies.
  fn set_vote<'a>(
    &'a self,
    message_id: i64,
    session_id: &'a str,
    choice: VoteChoice,
    ts: DateTime<Utc>,
  ) -> impl Future<Output = Result<VoteCounts, Self::Error>> + Send + 'a;

  fn vote_counts(
    &self,
    message_id: i64,
  ) -> impl Future<Output = Result<VoteCounts, Self::Error>> + Send + '_;

  /// The vote `session_id` currently holds on `message_id`, if any.
  fn session_vote<'a>(
    &'a self,
    message_id: i64,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<VoteKind>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Create or refresh a session's identity fields. `now` becomes
  /// `created_ts` for rows that do not exist yet. Never touches the posting
  /// counters.
  fn upsert_session(
    &self,
    identity: SessionIdentity,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_session<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  fn update_session_fingerprint<'a>(
    &'a self,
    session_id: &'a str,
    fingerprint: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Sessions ordered by most recent post, for the operator view.
  fn recent_sessions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Charge one post to the session: bump the window counter and stamp
  /// `last_post_ts`.
  fn record_post<'a>(
    &'a self,
    session_id: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Posts charged to the session's current window.
  ///
  /// The window restarts (and the stored counter resets) when `now` is more
  /// than `window` past the last post; otherwise every post extends it.
  /// Unknown sessions and sessions that have never posted count zero.
  fn posts_in_window<'a>(
    &'a self,
    session_id: &'a str,
    window: Duration,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  // ── Retention ─────────────────────────────────────────────────────────

  /// Delete oldest unpinned messages (and their votes) until the channel's
  /// total content size fits in `max_bytes`. Pinned messages are never
  /// touched. Returns how many rows went away.
  fn evict_channel<'a>(
    &'a self,
    channel: &'a str,
    max_bytes: u64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Status ────────────────────────────────────────────────────────────

  /// Upsert the heartbeat row for `process`.
  fn set_status<'a>(
    &'a self,
    process: &'a str,
    radio_connected: bool,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_status<'a>(
    &'a self,
    process: &'a str,
  ) -> impl Future<Output = Result<Option<HubStatus>, Self::Error>> + Send + 'a;

  // ── Stats ─────────────────────────────────────────────────────────────

  fn counts(
    &self,
  ) -> impl Future<Output = Result<StoreCounts, Self::Error>> + Send + '_;
}
