use std::{
  sync::atomic::{AtomicBool, Ordering},
  time::{Duration, Instant},
};

use chrono::{DateTime, TimeZone as _, Utc};
use parking_lot::Mutex;
use tack_core::{
  channel::ChannelMap,
  message::{NewMessage, Source},
  outbox::NewOutboxEntry,
  radio::{CHANNEL_SECRET_LEN, LinkError, LinkResult, RadioEvent, RadioLink},
  status::RELAY_PROCESS,
  store::{BoardStore, FeedPage},
};
use tack_store_sqlite::SqliteStore;

use crate::{heartbeat, link, retention, scheduler, scheduler::BackoffLadder};

const BASE_TS: i64 = 1_750_000_000;

const GENERAL_SECRET: [u8; CHANNEL_SECRET_LEN] = [
  0x4c, 0x49, 0xf3, 0xf2, 0x46, 0x29, 0xf5, 0xee, 0x4a, 0xd5, 0xb3, 0x96,
  0x5d, 0xb4, 0x79, 0x85,
];
const EVENTS_SECRET: [u8; CHANNEL_SECRET_LEN] = [
  0xd2, 0xcb, 0xcc, 0x60, 0x69, 0x79, 0xcd, 0xb0, 0x5c, 0x7b, 0xd6, 0x6f,
  0x49, 0xf2, 0x3b, 0xaa,
];

fn at(offset: i64) -> DateTime<Utc> {
  Utc.timestamp_opt(BASE_TS + offset, 0).unwrap()
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.unwrap()
}

fn channels() -> ChannelMap {
  ChannelMap::new(
    vec!["#general".to_owned(), "#events".to_owned()],
    vec!["#local".to_owned()],
  )
}

fn queued(channel: &str, content: &str, offset: i64) -> NewOutboxEntry {
  NewOutboxEntry {
    ts:          at(offset),
    channel:     channel.to_owned(),
    sender:      "ana".to_owned(),
    content:     content.to_owned(),
    session_id:  "s-1".to_owned(),
    fingerprint: Some("ab".repeat(20)),
  }
}

fn mesh_post(channel: &str, sender: &str, content: &str, offset: i64) -> NewMessage {
  NewMessage {
    ts:          at(offset),
    channel:     channel.to_owned(),
    sender:      sender.to_owned(),
    content:     content.to_owned(),
    source:      Source::Mesh,
    session_id:  None,
    fingerprint: None,
  }
}

// ─── ScriptedLink ────────────────────────────────────────────────────────────

/// A link double that records every call and fails on demand.
#[derive(Default)]
struct ScriptedLink {
  fail_connect: AtomicBool,
  fail_sends:   AtomicBool,
  programmed:   Mutex<Vec<(usize, String, [u8; CHANNEL_SECRET_LEN])>>,
  sent:         Mutex<Vec<(usize, String)>>,
  dms:          Mutex<Vec<(String, String)>>,
}

impl RadioLink for ScriptedLink {
  async fn connect(&self) -> LinkResult<()> {
    if self.fail_connect.load(Ordering::Relaxed) {
      return Err(LinkError::Unavailable);
    }
    Ok(())
  }

  async fn set_channel(
    &self,
    idx: usize,
    name: &str,
    secret: [u8; CHANNEL_SECRET_LEN],
  ) -> LinkResult<()> {
    self.programmed.lock().push((idx, name.to_owned(), secret));
    Ok(())
  }

  async fn send_channel_message(&self, idx: usize, text: &str) -> LinkResult<()> {
    if self.fail_sends.load(Ordering::Relaxed) {
      return Err(LinkError::Unavailable);
    }
    self.sent.lock().push((idx, text.to_owned()));
    Ok(())
  }

  async fn send_direct_message(&self, dest: &str, text: &str) -> LinkResult<()> {
    self.dms.lock().push((dest.to_owned(), text.to_owned()));
    Ok(())
  }

  async fn recv(&self) -> Option<RadioEvent> {
    std::future::pending().await
  }
}

// ─── Backoff ladder ──────────────────────────────────────────────────────────

fn ladder() -> BackoffLadder {
  BackoffLadder::new(Duration::from_secs(30), Duration::from_secs(120))
}

#[test]
fn ladder_first_send_is_immediate() {
  let mut ladder = ladder();
  assert_eq!(ladder.required_wait(Instant::now()), Duration::ZERO);
  assert_eq!(ladder.level(), 0);
}

#[test]
fn ladder_climbs_through_every_rung_and_caps() {
  let mut ladder = ladder();
  let t0 = Instant::now();

  ladder.advance(t0);
  assert_eq!(ladder.required_wait(t0), Duration::from_secs(2));

  ladder.advance(t0 + Duration::from_secs(2));
  assert_eq!(
    ladder.required_wait(t0 + Duration::from_secs(2)),
    Duration::from_secs(5)
  );

  ladder.advance(t0 + Duration::from_secs(7));
  assert_eq!(
    ladder.required_wait(t0 + Duration::from_secs(7)),
    Duration::from_secs(30)
  );
  assert_eq!(ladder.level(), 3);

  // Further attempts stay on the top rung.
  ladder.advance(t0 + Duration::from_secs(37));
  assert_eq!(ladder.level(), 3);
  assert_eq!(
    ladder.required_wait(t0 + Duration::from_secs(37)),
    Duration::from_secs(30)
  );
}

#[test]
fn ladder_returns_the_remainder_mid_delay() {
  let mut ladder = ladder();
  let t0 = Instant::now();

  ladder.advance(t0);
  assert_eq!(
    ladder.required_wait(t0 + Duration::from_millis(500)),
    Duration::from_millis(1500)
  );
  assert_eq!(
    ladder.required_wait(t0 + Duration::from_secs(2)),
    Duration::ZERO
  );
}

#[test]
fn ladder_resets_only_after_the_idle_threshold() {
  let mut ladder = ladder();
  let t0 = Instant::now();
  for i in 0..4 {
    ladder.advance(t0 + Duration::from_secs(i * 30));
  }
  assert_eq!(ladder.level(), 3);
  let last = t0 + Duration::from_secs(90);

  // Exactly the threshold: ready (30s elapsed long ago) but still rung 3.
  assert_eq!(
    ladder.required_wait(last + Duration::from_secs(120)),
    Duration::ZERO
  );
  assert_eq!(ladder.level(), 3);

  // Past the threshold: back to rung 0, so the next climb starts over.
  assert_eq!(
    ladder.required_wait(last + Duration::from_secs(121)),
    Duration::ZERO
  );
  assert_eq!(ladder.level(), 0);
  ladder.advance(last + Duration::from_secs(121));
  assert_eq!(ladder.level(), 1);
}

// ─── Delivery ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deliver_sends_one_entry_and_records_the_message() {
  let store = store().await;
  let link = ScriptedLink::default();
  let channels = channels();

  let first = store.queue_outbox(queued("#events", "tool library open", 10)).await.unwrap();
  let second = store.queue_outbox(queued("#events", "second post", 20)).await.unwrap();

  let entry = store.oldest_pending_outbox().await.unwrap().unwrap();
  assert_eq!(entry.id, first.id);
  scheduler::deliver(&store, &link, &channels, &entry).await;

  // Content only goes on the air, addressed to the channel's slot.
  assert_eq!(*link.sent.lock(), vec![(1, "tool library open".to_owned())]);

  let feed = store
    .list_messages("#events", FeedPage::default())
    .await
    .unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].source, Source::Wifi);
  assert_eq!(feed[0].ts, at(10));
  assert_eq!(feed[0].session_id.as_deref(), Some("s-1"));
  assert_eq!(feed[0].fingerprint.as_deref(), Some("ab".repeat(20).as_str()));

  // Exactly one entry was popped; the next oldest is now first in line.
  let next = store.oldest_pending_outbox().await.unwrap().unwrap();
  assert_eq!(next.id, second.id);
}

#[tokio::test]
async fn deliver_leaves_the_entry_pending_when_the_link_fails() {
  let store = store().await;
  let link = ScriptedLink::default();
  link.fail_sends.store(true, Ordering::Relaxed);
  let channels = channels();

  let entry = store.queue_outbox(queued("#general", "hello", 0)).await.unwrap();
  let popped = store.oldest_pending_outbox().await.unwrap().unwrap();
  scheduler::deliver(&store, &link, &channels, &popped).await;

  assert!(link.sent.lock().is_empty());
  let feed = store
    .list_messages("#general", FeedPage::default())
    .await
    .unwrap();
  assert!(feed.is_empty());
  let still = store.oldest_pending_outbox().await.unwrap().unwrap();
  assert_eq!(still.id, entry.id);
}

#[tokio::test]
async fn deliver_keeps_entries_for_channels_the_hub_no_longer_carries() {
  let store = store().await;
  let link = ScriptedLink::default();
  let channels = channels();

  store.queue_outbox(queued("#ghost", "orphaned", 0)).await.unwrap();
  let entry = store.oldest_pending_outbox().await.unwrap().unwrap();
  scheduler::deliver(&store, &link, &channels, &entry).await;

  assert!(link.sent.lock().is_empty());
  assert!(store.oldest_pending_outbox().await.unwrap().is_some());
}

// ─── Link bring-up ───────────────────────────────────────────────────────────

#[test]
fn channel_secret_is_the_first_half_of_the_digest() {
  assert_eq!(link::channel_secret("#general"), GENERAL_SECRET);
  assert_eq!(link::channel_secret("#events"), EVENTS_SECRET);
}

#[tokio::test]
async fn bring_up_programs_every_mesh_slot_in_order() {
  let link = ScriptedLink::default();
  link::bring_up(&link, &channels()).await.unwrap();

  assert_eq!(
    *link.programmed.lock(),
    vec![
      (0, "#general".to_owned(), GENERAL_SECRET),
      (1, "#events".to_owned(), EVENTS_SECRET),
    ]
  );
}

#[tokio::test]
async fn bring_up_fails_when_connect_fails() {
  let link = ScriptedLink::default();
  link.fail_connect.store(true, Ordering::Relaxed);

  let result = link::bring_up(&link, &channels()).await;
  assert_eq!(result, Err(LinkError::Unavailable));
  assert!(link.programmed.lock().is_empty());
}

// ─── Inbound events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn channel_traffic_is_stored_under_the_slot_name() {
  let store = store().await;
  let link = ScriptedLink::default();
  let channels = channels();

  let event = RadioEvent::ChannelMessage {
    channel_idx: 0,
    sender:      "far-hub".to_owned(),
    text:        "market day saturday".to_owned(),
  };
  link::handle_event(&store, &link, &channels, event, at(50)).await;

  let feed = store
    .list_messages("#general", FeedPage::default())
    .await
    .unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].sender, "far-hub");
  assert_eq!(feed[0].source, Source::Mesh);
  assert_eq!(feed[0].ts, at(50));
  assert_eq!(feed[0].session_id, None);
}

#[tokio::test]
async fn traffic_on_unmapped_slots_gets_a_synthetic_channel() {
  let store = store().await;
  let link = ScriptedLink::default();
  let channels = channels();

  let event = RadioEvent::ChannelMessage {
    channel_idx: 7,
    sender:      "far-hub".to_owned(),
    text:        "stray".to_owned(),
  };
  link::handle_event(&store, &link, &channels, event, at(0)).await;

  let feed = store
    .list_messages("#channel-7", FeedPage::default())
    .await
    .unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].content, "stray");
}

#[tokio::test]
async fn direct_messages_are_answered_with_search_results() {
  let store = store().await;
  let link = ScriptedLink::default();
  let channels = channels();

  store
    .insert_message(mesh_post("#general", "ana", "rain barrels for trade", 30))
    .await
    .unwrap();

  let event = RadioEvent::DirectMessage {
    sender: "ab12cd".to_owned(),
    text:   "search rain".to_owned(),
  };
  link::handle_event(&store, &link, &channels, event, at(60)).await;

  let expected = format!(
    "Results:\n#general ana {}: rain barrels for trade",
    BASE_TS + 30
  );
  assert_eq!(*link.dms.lock(), vec![("ab12cd".to_owned(), expected)]);
}

// ─── Search grammar ──────────────────────────────────────────────────────────

#[test]
fn parse_search_reads_channel_sender_and_keywords() {
  let query = link::parse_search("SEARCH #events sender:Ana rain gear").unwrap();
  assert_eq!(query.channel.as_deref(), Some("#events"));
  assert_eq!(query.sender.as_deref(), Some("Ana"));
  assert_eq!(query.text, "rain gear");
  assert_eq!(query.limit, Some(link::SEARCH_RESULT_LIMIT));
}

#[test]
fn parse_search_takes_only_the_first_channel_and_sender() {
  let query = link::parse_search("search sender:bob #x #y SENDER:carol hi").unwrap();
  assert_eq!(query.sender.as_deref(), Some("bob"));
  assert_eq!(query.channel.as_deref(), Some("#x"));
  assert_eq!(query.text, "#y SENDER:carol hi");
}

#[test]
fn parse_search_rejects_other_commands() {
  assert!(link::parse_search("hello there").is_none());
  assert!(link::parse_search("").is_none());
  assert!(link::parse_search("searching rain").is_none());
}

#[test]
fn parse_search_accepts_a_bare_command() {
  let query = link::parse_search("search").unwrap();
  assert_eq!(query.text, "");
  assert_eq!(query.channel, None);
  assert_eq!(query.sender, None);
}

#[tokio::test]
async fn search_reply_covers_usage_hits_and_misses() {
  let store = store().await;
  store
    .insert_message(mesh_post("#general", "ana", "rain barrels", 10))
    .await
    .unwrap();
  store
    .insert_message(mesh_post("#events", "bob", "rain or shine", 20))
    .await
    .unwrap();

  let usage = link::search_reply(&store, "what is this").await.unwrap();
  assert_eq!(usage, "Usage: search [#channel] [sender:name] keyword");

  let none = link::search_reply(&store, "search sunshine").await.unwrap();
  assert_eq!(none, "No results.");

  // A bare `search` has an empty keyword string, which matches nothing.
  let bare = link::search_reply(&store, "search").await.unwrap();
  assert_eq!(bare, "No results.");

  let hits = link::search_reply(&store, "search rain").await.unwrap();
  let expected = format!(
    "Results:\n#events bob {}: rain or shine\n#general ana {}: rain barrels",
    BASE_TS + 20,
    BASE_TS + 10
  );
  assert_eq!(hits, expected);

  let filtered = link::search_reply(&store, "search #general rain").await.unwrap();
  assert_eq!(
    filtered,
    format!("Results:\n#general ana {}: rain barrels", BASE_TS + 10)
  );
}

// ─── Heartbeat and retention ─────────────────────────────────────────────────

#[tokio::test]
async fn heartbeat_upserts_the_relay_status_row() {
  let store = store().await;

  heartbeat::beat(&store, true, at(0)).await;
  let row = store.get_status(RELAY_PROCESS).await.unwrap().unwrap();
  assert!(row.radio_connected);
  assert_eq!(row.last_seen_ts, at(0));

  heartbeat::beat(&store, false, at(30)).await;
  let row = store.get_status(RELAY_PROCESS).await.unwrap().unwrap();
  assert!(!row.radio_connected);
  assert_eq!(row.last_seen_ts, at(30));
}

#[tokio::test]
async fn retention_pass_trims_every_channel_to_budget() {
  let store = store().await;
  let channels = channels();

  for (i, channel) in ["#general", "#local"].iter().enumerate() {
    for j in 0..3 {
      let offset = (i as i64) * 100 + j * 10;
      store
        .insert_message(mesh_post(channel, "ana", &"x".repeat(40), offset))
        .await
        .unwrap();
    }
  }

  // 120 bytes per channel against a 60-byte budget leaves one message each.
  retention::pass(&store, &channels, 60).await;

  for channel in ["#general", "#local"] {
    let feed = store
      .list_messages(channel, FeedPage::default())
      .await
      .unwrap();
    assert_eq!(feed.len(), 1, "channel {channel} not trimmed to budget");
  }
}

#[tokio::test]
async fn radio_health_flag_is_shared_between_clones() {
  let health = link::RadioHealth::new();
  let seen_by_heartbeat = health.clone();

  assert!(!seen_by_heartbeat.is_connected());
  health.set_connected(true);
  assert!(seen_by_heartbeat.is_connected());
  health.set_connected(false);
  assert!(!seen_by_heartbeat.is_connected());
}
