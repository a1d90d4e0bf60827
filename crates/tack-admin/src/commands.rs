//! One function per subcommand, all thin pass-throughs onto the store.

use std::io;

use anyhow::Result;
use tack_core::{
  config::HubConfig,
  message::Source,
  store::{BoardStore, RecentFilter},
};
use tack_store_sqlite::SqliteStore;

use crate::format;

// ─── Pins ────────────────────────────────────────────────────────────────────

pub async fn pin(store: &SqliteStore, message_id: i64, order: Option<i64>) -> Result<()> {
  store.pin_message(message_id, order).await?;
  println!("Pinned message {message_id}");
  Ok(())
}

pub async fn unpin(store: &SqliteStore, message_id: i64) -> Result<()> {
  store.unpin_message(message_id).await?;
  println!("Unpinned message {message_id}");
  Ok(())
}

// ─── Stats and retention ─────────────────────────────────────────────────────

pub async fn stats(store: &SqliteStore) -> Result<()> {
  let counts = store.counts().await?;
  println!("{counts}");
  Ok(())
}

pub async fn cleanup(
  store: &SqliteStore,
  cfg: &HubConfig,
  channel: Option<String>,
) -> Result<()> {
  let map = cfg.channel_map();
  let channels: Vec<String> = match channel {
    Some(one) => vec![one],
    None => map.all().into_iter().map(str::to_owned).collect(),
  };

  let mut total = 0u64;
  for channel in &channels {
    total += store
      .evict_channel(channel, cfg.limits.retention_bytes_per_channel)
      .await?;
  }
  println!("deleted={total}");
  Ok(())
}

// ─── Outbox ──────────────────────────────────────────────────────────────────

pub async fn outbox_list(
  store: &SqliteStore,
  channel: Option<String>,
  limit: usize,
) -> Result<()> {
  let entries = store.pending_outbox(channel.as_deref(), limit).await?;
  println!("{}", format::outbox_header());
  for entry in &entries {
    println!("{}", format::outbox_row(entry));
  }
  Ok(())
}

pub async fn outbox_cancel(store: &SqliteStore, outbox_id: i64, yes: bool) -> Result<()> {
  let Some(entry) = store.outbox_entry(outbox_id).await? else {
    println!("canceled=0");
    return Ok(());
  };

  println!(
    "[{}] <{}> {}",
    format::short_ts(entry.ts),
    entry.sender,
    entry.content
  );
  if !yes && !confirm("Cancel this entry? [y/N] ")? {
    println!("canceled=0");
    return Ok(());
  }

  let canceled = store.cancel_outbox(outbox_id).await?;
  println!("canceled={}", u8::from(canceled));
  Ok(())
}

pub async fn outbox_clear(store: &SqliteStore, yes: bool) -> Result<()> {
  if !yes && !confirm("Clear every pending entry? [y/N] ")? {
    println!("cleared=0");
    return Ok(());
  }
  let cleared = store.clear_outbox().await?;
  println!("cleared={cleared}");
  Ok(())
}

// ─── Sessions ────────────────────────────────────────────────────────────────

pub async fn sessions_list(store: &SqliteStore, limit: usize) -> Result<()> {
  let sessions = store.recent_sessions(limit).await?;
  let id_width =
    format::session_id_width(sessions.iter().map(|s| s.session_id.as_str()));
  println!("{}", format::sessions_header(id_width));
  for session in &sessions {
    println!("{}", format::session_row(session, id_width));
  }
  Ok(())
}

pub async fn sessions_show(store: &SqliteStore, session_id: &str) -> Result<()> {
  let Some(session) = store.get_session(session_id).await? else {
    anyhow::bail!("unknown session {session_id}");
  };

  println!("session={}", session.session_id);
  println!("name={}", session.name);
  println!("location={}", session.location);
  println!("mac={}", session.mac_address.as_deref().unwrap_or("-"));
  println!("fingerprint={}", session.fingerprint.as_deref().unwrap_or("-"));
  println!("created={}", format::short_ts(session.created_ts));
  match session.last_post_ts {
    Some(ts) => println!("last_post={}", format::short_ts(ts)),
    None => println!("last_post=-"),
  }
  println!("post_count_hour={}", session.post_count_hour);
  Ok(())
}

// ─── Messages ────────────────────────────────────────────────────────────────

pub async fn messages_recent(
  store: &SqliteStore,
  channel: Option<String>,
  source: Option<String>,
  limit: usize,
) -> Result<()> {
  let source = source.map(|s| Source::parse(&s)).transpose()?;
  let filter = RecentFilter { channel, source, limit: Some(limit) };

  let messages = store.recent_messages(&filter).await?;
  println!("{}", format::recent_header());
  for message in &messages {
    println!("{}", format::recent_row(message));
  }
  Ok(())
}

// ─── Confirmation ────────────────────────────────────────────────────────────

/// Ask on stdout and read one stdin line.
fn confirm(question: &str) -> io::Result<bool> {
  use std::io::{BufRead as _, Write as _};

  print!("{question}");
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(accepts(&line))
}

/// Only `y` or `yes` (any case, surrounding whitespace ignored) proceeds.
pub(crate) fn accepts(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
