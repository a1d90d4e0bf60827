use chrono::{TimeZone as _, Utc};
use tack_core::{
  message::{Message, Source},
  outbox::OutboxEntry,
  session::Session,
};

use crate::{commands, format};

fn entry() -> OutboxEntry {
  OutboxEntry {
    id:          42,
    ts:          Utc.timestamp_opt(1_750_000_000, 0).unwrap(),
    channel:     "#general".to_owned(),
    sender:      "ana".to_owned(),
    content:     "tool library open saturday".to_owned(),
    session_id:  "s-1".to_owned(),
    fingerprint: None,
    sent:        false,
  }
}

fn message() -> Message {
  Message {
    id:          7,
    ts:          Utc.timestamp_opt(1_750_000_000, 0).unwrap(),
    channel:     "#events".to_owned(),
    sender:      "bob".to_owned(),
    content:     "rain barrels for trade".to_owned(),
    source:      Source::Mesh,
    session_id:  None,
    fingerprint: None,
    upvotes:     0,
    downvotes:   0,
    pinned:      false,
    pin_order:   None,
  }
}

fn session() -> Session {
  Session {
    session_id:      "sessabcdef".to_owned(),
    name:            "Ana".to_owned(),
    location:        "Front desk".to_owned(),
    mac_address:     Some("aa:bb:cc:dd:ee:ff".to_owned()),
    fingerprint:     None,
    created_ts:      Utc.timestamp_opt(1_750_000_000, 0).unwrap(),
    last_post_ts:    None,
    post_count_hour: 3,
  }
}

/// Character offset of the first occurrence of `needle`.
fn char_offset(line: &str, needle: &str) -> usize {
  let byte = line.find(needle).unwrap();
  line[..byte].chars().count()
}

// ─── Truncation ──────────────────────────────────────────────────────────────

#[test]
fn truncate_passes_short_values_through() {
  assert_eq!(format::truncate("hello", 10), "hello");
  assert_eq!(format::truncate("exactly-10", 10), "exactly-10");
}

#[test]
fn truncate_ellipsizes_within_the_width() {
  let out = format::truncate("a longer sentence", 10);
  assert_eq!(out, "a longe...");
  assert_eq!(out.chars().count(), 10);
}

#[test]
fn truncate_counts_characters_not_bytes() {
  let out = format::truncate("žluťoučký kůň", 8);
  assert_eq!(out, "žluťo...");
  assert_eq!(out.chars().count(), 8);
}

// ─── Table layout ────────────────────────────────────────────────────────────

#[test]
fn outbox_rows_line_up_with_the_header() {
  let header = format::outbox_header();
  let row = format::outbox_row(&entry());

  assert_eq!(char_offset(&row, "42"), char_offset(&header, "ID"));
  assert_eq!(char_offset(&row, "#general"), char_offset(&header, "CH"));
  assert_eq!(char_offset(&row, "ana"), char_offset(&header, "SENDER"));
  assert_eq!(char_offset(&row, "tool library"), char_offset(&header, "CONTENT"));
}

#[test]
fn outbox_rows_truncate_long_content() {
  let mut long = entry();
  long.content = "x".repeat(60);
  let row = format::outbox_row(&long);

  assert!(row.ends_with("..."));
  let start = char_offset(&row, "xxx");
  assert_eq!(row.chars().count() - start, format::CONTENT_W);
}

#[test]
fn recent_rows_line_up_with_the_header() {
  let header = format::recent_header();
  let row = format::recent_row(&message());

  assert_eq!(char_offset(&row, "7"), char_offset(&header, "ID"));
  assert_eq!(char_offset(&row, "#events"), char_offset(&header, "CH"));
  assert_eq!(char_offset(&row, "mesh"), char_offset(&header, "SRC"));
  assert_eq!(char_offset(&row, "bob"), char_offset(&header, "SENDER"));
  assert_eq!(char_offset(&row, "rain barrels"), char_offset(&header, "CONTENT"));
}

#[test]
fn session_rows_line_up_with_the_header() {
  let session = session();
  let width = format::session_id_width(std::iter::once(session.session_id.as_str()));
  let header = format::sessions_header(width);
  let row = format::session_row(&session, width);

  assert_eq!(char_offset(&row, "sessabcdef"), char_offset(&header, "SESSION"));
  assert_eq!(char_offset(&row, "-"), char_offset(&header, "LAST"));
  assert_eq!(char_offset(&row, "Ana"), char_offset(&header, "NAME"));
  assert_eq!(char_offset(&row, "Front desk"), char_offset(&header, "LOC"));
  assert_eq!(char_offset(&row, "aa:bb"), char_offset(&header, "MAC"));
  assert_eq!(char_offset(&row, "3"), char_offset(&header, "POSTS"));
}

#[test]
fn session_id_column_adapts_to_the_longest_id() {
  assert_eq!(format::session_id_width(std::iter::empty()), "SESSION".len());
  assert_eq!(format::session_id_width(["ab"].into_iter()), "SESSION".len());
  assert_eq!(
    format::session_id_width(["0123456789abcdef", "ab"].into_iter()),
    16
  );
}

// ─── Confirmation ────────────────────────────────────────────────────────────

#[test]
fn confirmation_accepts_only_yes_answers() {
  assert!(commands::accepts("y"));
  assert!(commands::accepts("Y"));
  assert!(commands::accepts("yes"));
  assert!(commands::accepts(" YES \n"));

  assert!(!commands::accepts(""));
  assert!(!commands::accepts("\n"));
  assert!(!commands::accepts("n"));
  assert!(!commands::accepts("no"));
  assert!(!commands::accepts("yep"));
}
