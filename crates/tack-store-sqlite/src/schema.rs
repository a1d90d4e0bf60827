//! SQL schema for the bulletin-board store.
//!
//! The table layout is a compatibility surface: existing hub databases must
//! open cleanly, so changes are additive only. New columns go through
//! [`migrate`], never through edits to an existing CREATE TABLE.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS messages (
    id          INTEGER PRIMARY KEY,
    ts          INTEGER NOT NULL,    -- epoch seconds
    channel     TEXT    NOT NULL,
    sender      TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    source      TEXT    NOT NULL,    -- 'mesh' | 'wifi' | 'local'
    session_id  TEXT,
    fingerprint TEXT,
    upvotes     INTEGER DEFAULT 0,
    downvotes   INTEGER DEFAULT 0,
    pinned      INTEGER DEFAULT 0,
    pin_order   INTEGER
);

-- Rows are immutable except for `sent`, which flips 0 -> 1 exactly once.
CREATE TABLE IF NOT EXISTS outbox (
    id          INTEGER PRIMARY KEY,
    ts          INTEGER NOT NULL,
    channel     TEXT    NOT NULL,
    sender      TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    session_id  TEXT    NOT NULL,
    fingerprint TEXT,
    sent        INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS votes (
    message_id INTEGER NOT NULL,
    session_id TEXT    NOT NULL,
    vote_type  INTEGER NOT NULL,     -- 1 = up, -1 = down
    ts         INTEGER NOT NULL,
    PRIMARY KEY (message_id, session_id)
);

-- Advisory identity; rows are never deleted.
CREATE TABLE IF NOT EXISTS sessions (
    session_id      TEXT PRIMARY KEY,
    name            TEXT,
    location        TEXT,
    mac_address     TEXT,
    fingerprint     TEXT,
    created_ts      INTEGER,
    last_post_ts    INTEGER,
    post_count_hour INTEGER DEFAULT 0
);

-- One heartbeat row per background process.
CREATE TABLE IF NOT EXISTS status (
    process         TEXT PRIMARY KEY,
    radio_connected INTEGER NOT NULL DEFAULT 0,
    last_seen_ts    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_channel_ts ON messages(channel, ts DESC);
CREATE INDEX IF NOT EXISTS idx_messages_pinned     ON messages(pinned, pin_order);
CREATE INDEX IF NOT EXISTS idx_outbox_pending      ON outbox(sent, ts);
CREATE INDEX IF NOT EXISTS idx_votes_message       ON votes(message_id);
CREATE INDEX IF NOT EXISTS idx_sessions_mac        ON sessions(mac_address);
";

/// Column additions for databases created before those columns existed.
/// Presence-checked, so re-running is harmless.
pub fn migrate(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  add_column_if_missing(conn, "sessions", "fingerprint", "TEXT")?;
  add_column_if_missing(conn, "messages", "session_id", "TEXT")?;
  add_column_if_missing(conn, "messages", "fingerprint", "TEXT")?;
  add_column_if_missing(conn, "outbox", "fingerprint", "TEXT")?;
  Ok(())
}

fn add_column_if_missing(
  conn: &rusqlite::Connection,
  table: &str,
  column: &str,
  decl: &str,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
  let present = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .iter()
    .any(|name| name == column);
  if !present {
    tracing::info!(table, column, "adding missing column");
    conn.execute(
      &format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"),
      [],
    )?;
  }
  Ok(())
}
