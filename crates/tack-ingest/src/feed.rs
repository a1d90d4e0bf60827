//! Channel feed assembly.
//!
//! A feed page is pinned messages (in pin order), then unpinned messages
//! newest-first. On the first page of a mesh channel the viewer's hub also
//! overlays pending outbox entries ahead of everything else, so a fresh
//! post shows up immediately even though it has not been on the air yet.

use serde::Serialize;
use tack_core::{
  channel::{ChannelMap, ChannelScope},
  message::Message,
  outbox::OutboxEntry,
  store::{BoardStore, FeedPage},
  vote::VoteKind,
};

use crate::{Error, Result};

/// Pending overlay depth on the first page.
const PENDING_OVERLAY_LIMIT: usize = 10;

/// One item in a rendered channel feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedItem {
  /// A stored message, annotated with the viewer's current vote.
  Posted {
    message:     Message,
    viewer_vote: Option<VoteKind>,
  },
  /// An outbox entry still waiting for airtime. Not yet votable.
  Pending { entry: OutboxEntry },
}

/// Assemble one page of a channel's feed for a viewer.
///
/// `viewer` is the requesting session, if any; it only affects vote
/// annotations. Unknown channels yield an empty feed rather than an error —
/// the channel list shown to clients is the caller's concern.
pub async fn channel_feed<S>(
  store: &S,
  channels: &ChannelMap,
  viewer: Option<&str>,
  channel: &str,
  limit: usize,
  offset: usize,
) -> Result<Vec<FeedItem>>
where
  S: BoardStore,
{
  let page = FeedPage { limit, offset, include_pinned: true };
  let messages = store
    .list_messages(channel, page)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let mut items = Vec::with_capacity(messages.len());

  if channels.scope(channel) == Some(ChannelScope::Mesh) && offset == 0 {
    let pending = store
      .pending_outbox_for_channel(channel, PENDING_OVERLAY_LIMIT)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    items.extend(pending.into_iter().map(|entry| FeedItem::Pending { entry }));
  }

  for message in messages {
    let viewer_vote = match viewer {
      Some(sid) => store
        .session_vote(message.id, sid)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?,
      None => None,
    };
    items.push(FeedItem::Posted { message, viewer_vote });
  }

  Ok(items)
}
