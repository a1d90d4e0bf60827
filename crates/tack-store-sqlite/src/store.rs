//! [`SqliteStore`] — the SQLite implementation of [`BoardStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use tack_core::{
  message::{Message, NewMessage},
  outbox::{NewOutboxEntry, OutboxEntry},
  session::{Session, SessionIdentity},
  status::HubStatus,
  store::{BoardStore, FeedPage, RecentFilter, SearchQuery, StoreCounts},
  vote::{VoteChoice, VoteCounts, VoteKind},
};

use crate::{
  encode::{MessageRow, OutboxRow, SessionRow, StatusRow, decode_vote, encode_ts},
  schema::{SCHEMA, migrate},
  Error, Result,
};

/// How long a writer waits on the other process's lock before the call fails
/// with [`Error::Busy`].
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bulletin-board store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// trait method is one `call` onto the connection's thread, and
/// multi-statement operations run inside an explicit transaction there.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT).await
  }

  /// Open with an explicit lock-wait budget.
  pub async fn open_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(DEFAULT_BUSY_TIMEOUT).await?;
    Ok(store)
  }

  /// Adopt an already-open connection and run schema initialisation on it.
  /// Lets tests seed a database with legacy DDL first.
  #[cfg(test)]
  pub(crate) async fn from_connection(
    conn: tokio_rusqlite::Connection,
  ) -> Result<Self> {
    let store = Self { conn };
    store.init_schema(DEFAULT_BUSY_TIMEOUT).await?;
    Ok(store)
  }

  async fn init_schema(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        migrate(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Vote recount ────────────────────────────────────────────────────────────

/// Recompute a message's tallies from the `votes` table and write them back.
/// Runs inside the caller's transaction so readers never see stale counters.
fn recount_votes(
  conn: &rusqlite::Connection,
  message_id: i64,
) -> rusqlite::Result<VoteCounts> {
  let up: i64 = conn.query_row(
    "SELECT COUNT(*) FROM votes WHERE message_id = ?1 AND vote_type = 1",
    rusqlite::params![message_id],
    |row| row.get(0),
  )?;
  let down: i64 = conn.query_row(
    "SELECT COUNT(*) FROM votes WHERE message_id = ?1 AND vote_type = -1",
    rusqlite::params![message_id],
    |row| row.get(0),
  )?;
  conn.execute(
    "UPDATE messages SET upvotes = ?1, downvotes = ?2 WHERE id = ?3",
    rusqlite::params![up, down, message_id],
  )?;
  Ok(VoteCounts { up, down })
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = Error;

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn insert_message(&self, input: NewMessage) -> Result<Message> {
    let ts_secs     = encode_ts(input.ts);
    let channel     = input.channel.clone();
    let sender      = input.sender.clone();
    let content     = input.content.clone();
    let source      = input.source.as_str();
    let session_id  = input.session_id.clone();
    let fingerprint = input.fingerprint.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages
             (ts, channel, sender, content, source, session_id, fingerprint)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            ts_secs,
            channel,
            sender,
            content,
            source,
            session_id,
            fingerprint,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Message {
      id,
      ts:          input.ts,
      channel:     input.channel,
      sender:      input.sender,
      content:     input.content,
      source:      input.source,
      session_id:  input.session_id,
      fingerprint: input.fingerprint,
      upvotes:     0,
      downvotes:   0,
      pinned:      false,
      pin_order:   None,
    })
  }

  async fn get_message(&self, id: i64) -> Result<Option<Message>> {
    let raw: Option<MessageRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM messages WHERE id = ?1",
                MessageRow::COLUMNS
              ),
              rusqlite::params![id],
              MessageRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(MessageRow::into_message).transpose()
  }

  async fn list_messages(
    &self,
    channel: &str,
    page: FeedPage,
  ) -> Result<Vec<Message>> {
    let channel = channel.to_owned();

    let raws: Vec<MessageRow> = self
      .conn
      .call(move |conn| {
        let mut rows = Vec::new();

        if page.include_pinned {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM messages WHERE channel = ?1 AND pinned = 1
             ORDER BY pin_order ASC NULLS LAST, ts DESC",
            MessageRow::COLUMNS
          ))?;
          rows.extend(
            stmt
              .query_map(rusqlite::params![channel], MessageRow::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?,
          );
        }

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM messages WHERE channel = ?1 AND pinned = 0
           ORDER BY ts DESC LIMIT ?2 OFFSET ?3",
          MessageRow::COLUMNS
        ))?;
        rows.extend(
          stmt
            .query_map(
              rusqlite::params![
                channel,
                page.limit as i64,
                page.offset as i64
              ],
              MessageRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        );

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(MessageRow::into_message).collect()
  }

  async fn search_messages(&self, query: &SearchQuery) -> Result<Vec<Message>> {
    let text = query.text.trim();
    if text.is_empty() {
      return Ok(Vec::new());
    }

    let text_pattern   = format!("%{text}%");
    let channel        = query.channel.clone();
    let sender_pattern = query.sender.as_deref().map(|s| format!("%{s}%"));
    let limit          = query.limit.unwrap_or(5) as i64;

    let raws: Vec<MessageRow> = self
      .conn
      .call(move |conn| {
        let mut conds = vec!["content LIKE ?1"];
        if channel.is_some() {
          conds.push("channel = ?2");
        }
        if sender_pattern.is_some() {
          conds.push("sender LIKE ?3");
        }

        let sql = format!(
          "SELECT {} FROM messages WHERE {} ORDER BY ts DESC LIMIT ?4",
          MessageRow::COLUMNS,
          conds.join(" AND "),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![text_pattern, channel, sender_pattern, limit],
            MessageRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(MessageRow::into_message).collect()
  }

  async fn recent_messages(
    &self,
    filter: &RecentFilter,
  ) -> Result<Vec<Message>> {
    let channel = filter.channel.clone();
    let source  = filter.source.map(|s| s.as_str());
    let limit   = filter.limit.unwrap_or(20) as i64;

    let raws: Vec<MessageRow> = self
      .conn
      .call(move |conn| {
        let mut conds = vec!["1 = 1"];
        if channel.is_some() {
          conds.push("channel = ?1");
        }
        if source.is_some() {
          conds.push("source = ?2");
        }

        let sql = format!(
          "SELECT {} FROM messages WHERE {} ORDER BY ts DESC LIMIT ?3",
          MessageRow::COLUMNS,
          conds.join(" AND "),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![channel, source, limit],
            MessageRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(MessageRow::into_message).collect()
  }

  // ── Pins ──────────────────────────────────────────────────────────────────

  async fn pin_message(&self, id: i64, order: Option<i64>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let order = match order {
          Some(o) => o,
          None => {
            let max: i64 = tx.query_row(
              "SELECT COALESCE(MAX(pin_order), 0) FROM messages
               WHERE pinned = 1",
              [],
              |row| row.get(0),
            )?;
            max + 1
          }
        };
        tx.execute(
          "UPDATE messages SET pinned = 1, pin_order = ?1 WHERE id = ?2",
          rusqlite::params![order, id],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unpin_message(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE messages SET pinned = 0, pin_order = NULL WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Outbox ────────────────────────────────────────────────────────────────

  async fn queue_outbox(&self, input: NewOutboxEntry) -> Result<OutboxEntry> {
    let ts_secs     = encode_ts(input.ts);
    let channel     = input.channel.clone();
    let sender      = input.sender.clone();
    let content     = input.content.clone();
    let session_id  = input.session_id.clone();
    let fingerprint = input.fingerprint.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO outbox
             (ts, channel, sender, content, session_id, fingerprint, sent)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
          rusqlite::params![
            ts_secs,
            channel,
            sender,
            content,
            session_id,
            fingerprint,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(OutboxEntry {
      id,
      ts:          input.ts,
      channel:     input.channel,
      sender:      input.sender,
      content:     input.content,
      session_id:  input.session_id,
      fingerprint: input.fingerprint,
      sent:        false,
    })
  }

  async fn oldest_pending_outbox(&self) -> Result<Option<OutboxEntry>> {
    let raw: Option<OutboxRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM outbox WHERE sent = 0
                 ORDER BY ts ASC, id ASC LIMIT 1",
                OutboxRow::COLUMNS
              ),
              [],
              OutboxRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(OutboxRow::into_entry).transpose()
  }

  async fn pending_outbox_for_channel(
    &self,
    channel: &str,
    limit: usize,
  ) -> Result<Vec<OutboxEntry>> {
    let channel = channel.to_owned();
    let limit = limit as i64;

    let raws: Vec<OutboxRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM outbox WHERE sent = 0 AND channel = ?1
           ORDER BY ts DESC, id DESC LIMIT ?2",
          OutboxRow::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![channel, limit], OutboxRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(OutboxRow::into_entry).collect()
  }

  async fn pending_outbox(
    &self,
    channel: Option<&str>,
    limit: usize,
  ) -> Result<Vec<OutboxEntry>> {
    let channel = channel.map(str::to_owned);
    let limit = limit as i64;

    let raws: Vec<OutboxRow> = self
      .conn
      .call(move |conn| {
        let mut conds = vec!["sent = 0"];
        if channel.is_some() {
          conds.push("channel = ?1");
        }

        let sql = format!(
          "SELECT {} FROM outbox WHERE {} ORDER BY ts ASC, id ASC LIMIT ?2",
          OutboxRow::COLUMNS,
          conds.join(" AND "),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![channel, limit], OutboxRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(OutboxRow::into_entry).collect()
  }

  async fn outbox_entry(&self, id: i64) -> Result<Option<OutboxEntry>> {
    let raw: Option<OutboxRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM outbox WHERE id = ?1",
                OutboxRow::COLUMNS
              ),
              rusqlite::params![id],
              OutboxRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(OutboxRow::into_entry).transpose()
  }

  async fn mark_outbox_sent(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE outbox SET sent = 1 WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn cancel_outbox(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM outbox WHERE id = ?1 AND sent = 0",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn clear_outbox(&self) -> Result<u64> {
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM outbox WHERE sent = 0", [])?))
      .await?;
    Ok(deleted as u64)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn set_vote(
    &self,
    message_id: i64,
    session_id: &str,
    choice: VoteChoice,
    ts: DateTime<Utc>,
  ) -> Result<VoteCounts> {
    let session_id = session_id.to_owned();
    let ts_secs = encode_ts(ts);

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match choice.kind() {
          None => {
            tx.execute(
              "DELETE FROM votes WHERE message_id = ?1 AND session_id = ?2",
              rusqlite::params![message_id, session_id],
            )?;
          }
          Some(kind) => {
            tx.execute(
              "INSERT INTO votes (message_id, session_id, vote_type, ts)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (message_id, session_id)
               DO UPDATE SET vote_type = excluded.vote_type, ts = excluded.ts",
              rusqlite::params![
                message_id,
                session_id,
                kind.as_signed(),
                ts_secs
              ],
            )?;
          }
        }
        let counts = recount_votes(&tx, message_id)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    Ok(counts)
  }

  async fn vote_counts(&self, message_id: i64) -> Result<VoteCounts> {
    let raw: Option<(Option<i64>, Option<i64>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT upvotes, downvotes FROM messages WHERE id = ?1",
              rusqlite::params![message_id],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let (up, down) = raw.unwrap_or((None, None));
    Ok(VoteCounts { up: up.unwrap_or(0), down: down.unwrap_or(0) })
  }

  async fn session_vote(
    &self,
    message_id: i64,
    session_id: &str,
  ) -> Result<Option<VoteKind>> {
    let session_id = session_id.to_owned();

    let raw: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT vote_type FROM votes
               WHERE message_id = ?1 AND session_id = ?2",
              rusqlite::params![message_id, session_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(decode_vote).transpose()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn upsert_session(
    &self,
    identity: SessionIdentity,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let now_secs = encode_ts(now);
    let SessionIdentity { session_id, name, location, mac_address, fingerprint } =
      identity;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions
             (session_id, name, location, mac_address, fingerprint,
              created_ts, last_post_ts, post_count_hour)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0)
           ON CONFLICT (session_id) DO UPDATE SET
             name        = excluded.name,
             location    = excluded.location,
             mac_address = COALESCE(excluded.mac_address, sessions.mac_address),
             fingerprint = COALESCE(excluded.fingerprint, sessions.fingerprint)",
          rusqlite::params![
            session_id,
            name,
            location,
            mac_address,
            fingerprint,
            now_secs,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
    let session_id = session_id.to_owned();

    let raw: Option<SessionRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM sessions WHERE session_id = ?1",
                SessionRow::COLUMNS
              ),
              rusqlite::params![session_id],
              SessionRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(SessionRow::into_session).transpose()
  }

  async fn update_session_fingerprint(
    &self,
    session_id: &str,
    fingerprint: &str,
  ) -> Result<()> {
    let session_id = session_id.to_owned();
    let fingerprint = fingerprint.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE sessions SET fingerprint = ?1 WHERE session_id = ?2",
          rusqlite::params![fingerprint, session_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>> {
    let limit = limit as i64;

    let raws: Vec<SessionRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM sessions ORDER BY last_post_ts DESC LIMIT ?1",
          SessionRow::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], SessionRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(SessionRow::into_session).collect()
  }

  async fn record_post(
    &self,
    session_id: &str,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let session_id = session_id.to_owned();
    let now_secs = encode_ts(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE sessions
           SET last_post_ts = ?1,
               post_count_hour = COALESCE(post_count_hour, 0) + 1
           WHERE session_id = ?2",
          rusqlite::params![now_secs, session_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn posts_in_window(
    &self,
    session_id: &str,
    window: chrono::Duration,
    now: DateTime<Utc>,
  ) -> Result<i64> {
    let session_id = session_id.to_owned();
    let window_secs = window.num_seconds();
    let now_secs = encode_ts(now);

    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row: Option<(Option<i64>, Option<i64>)> = tx
          .query_row(
            "SELECT last_post_ts, post_count_hour FROM sessions
             WHERE session_id = ?1",
            rusqlite::params![session_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        let count = match row {
          None | Some((None, _)) => 0,
          Some((Some(last), count)) => {
            if now_secs - last > window_secs {
              // Window expired; persist the reset.
              tx.execute(
                "UPDATE sessions SET post_count_hour = 0
                 WHERE session_id = ?1",
                rusqlite::params![session_id],
              )?;
              0
            } else {
              count.unwrap_or(0)
            }
          }
        };
        tx.commit()?;
        Ok(count)
      })
      .await?;

    Ok(count)
  }

  // ── Retention ─────────────────────────────────────────────────────────────

  async fn evict_channel(&self, channel: &str, max_bytes: u64) -> Result<u64> {
    let channel = channel.to_owned();
    let budget = max_bytes.min(i64::MAX as u64) as i64;

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut total: i64 = tx.query_row(
          "SELECT COALESCE(SUM(LENGTH(content)), 0) FROM messages
           WHERE channel = ?1",
          rusqlite::params![channel],
          |row| row.get(0),
        )?;

        let mut deleted = 0u64;
        while total > budget {
          let oldest: Option<(i64, i64)> = tx
            .query_row(
              "SELECT id, LENGTH(content) FROM messages
               WHERE channel = ?1 AND pinned = 0
               ORDER BY ts ASC, id ASC LIMIT 1",
              rusqlite::params![channel],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

          // Only pinned messages remain; stop even if still over budget.
          let Some((id, size)) = oldest else { break };

          tx.execute(
            "DELETE FROM messages WHERE id = ?1",
            rusqlite::params![id],
          )?;
          // Votes are not FK-enforced; clean them up alongside.
          tx.execute(
            "DELETE FROM votes WHERE message_id = ?1",
            rusqlite::params![id],
          )?;
          total -= size;
          deleted += 1;
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    Ok(deleted)
  }

  // ── Status ────────────────────────────────────────────────────────────────

  async fn set_status(
    &self,
    process: &str,
    radio_connected: bool,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let process = process.to_owned();
    let connected = radio_connected as i64;
    let now_secs = encode_ts(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO status (process, radio_connected, last_seen_ts)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (process) DO UPDATE SET
             radio_connected = excluded.radio_connected,
             last_seen_ts    = excluded.last_seen_ts",
          rusqlite::params![process, connected, now_secs],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_status(&self, process: &str) -> Result<Option<HubStatus>> {
    let process = process.to_owned();

    let raw: Option<StatusRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM status WHERE process = ?1",
                StatusRow::COLUMNS
              ),
              rusqlite::params![process],
              StatusRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(StatusRow::into_status).transpose()
  }

  // ── Stats ─────────────────────────────────────────────────────────────────

  async fn counts(&self) -> Result<StoreCounts> {
    let counts = self
      .conn
      .call(move |conn| {
        let messages: i64 =
          conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
        let sessions: i64 =
          conn.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?;
        let outbox_pending: i64 = conn.query_row(
          "SELECT COUNT(*) FROM outbox WHERE sent = 0",
          [],
          |r| r.get(0),
        )?;
        let votes: i64 =
          conn.query_row("SELECT COUNT(*) FROM votes", [], |r| r.get(0))?;
        Ok(StoreCounts { messages, sessions, outbox_pending, votes })
      })
      .await?;

    Ok(counts)
  }
}
