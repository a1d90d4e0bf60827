//! Post acceptance — validation, rate limiting, and routing.
//!
//! Local channels store the message directly; mesh channels queue an outbox
//! entry for the relay to pace onto the air. Validation failures reject the
//! whole post; nothing is written before the rate check passes.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tack_core::{
  channel::{ChannelMap, ChannelScope},
  config::{HubConfig, RATE_WINDOW_SECS},
  message::{NewMessage, Source},
  outbox::NewOutboxEntry,
  session::{Session, SessionIdentity},
  store::BoardStore,
};

use crate::{
  Error, Result,
  audit::{AuditEvent, AuditSink, ClientInfo},
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// A post submitted through the captive portal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
  pub channel: String,
  pub content: String,
  /// Display name; empty posts anonymously.
  #[serde(default)]
  pub name:    String,
  /// Optional client hint, normalised to lowercase before storage.
  #[serde(default)]
  pub fingerprint: Option<String>,
}

/// Where an accepted post landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
  /// Stored directly; on-site channels never touch the radio.
  Local { message_id: i64 },
  /// Queued for paced relay onto the mesh.
  Queued { outbox_id: i64 },
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn name_is_clean(name: &str) -> bool {
  name
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
}

// ─── accept_post ─────────────────────────────────────────────────────────────

/// Validate and store one post for an already-resolved session.
///
/// Checks run in order: channel known, content non-empty, name within
/// length and character limits, content within length limit, session under
/// its posting allowance. The first failure wins. On acceptance the
/// session's identity is refreshed and the post is charged to its window.
pub async fn accept_post<S>(
  store: &S,
  cfg: &HubConfig,
  channels: &ChannelMap,
  audit: &AuditSink,
  client: &ClientInfo,
  session: &Session,
  post: NewPost,
  now: DateTime<Utc>,
) -> Result<Accepted>
where
  S: BoardStore,
{
  let sid = session.session_id.as_str();

  let Some(scope) = channels.scope(&post.channel) else {
    return Err(Error::UnknownChannel(post.channel));
  };
  if post.content.is_empty() {
    return Err(Error::Validation("empty message".into()));
  }
  if post.name.chars().count() > cfg.limits.name_max_chars {
    audit.record(AuditEvent::InvalidName, client, Some(sid), "name too long", now);
    return Err(Error::Validation("name too long".into()));
  }
  if !name_is_clean(&post.name) {
    audit.record(
      AuditEvent::InvalidName,
      client,
      Some(sid),
      "name invalid characters",
      now,
    );
    return Err(Error::Validation("name invalid".into()));
  }
  if post.content.chars().count() > cfg.limits.message_max_chars {
    return Err(Error::Validation("message too long".into()));
  }

  let posted = store
    .posts_in_window(sid, Duration::seconds(RATE_WINDOW_SECS), now)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let limit = cfg.limits.posts_per_hour;
  if posted >= limit {
    audit.record(
      AuditEvent::RateLimitExceeded,
      client,
      Some(sid),
      "rate limit exceeded",
      now,
    );
    return Err(Error::RateLimited { posted, limit });
  }

  let fingerprint = post
    .fingerprint
    .as_deref()
    .map(|f| f.trim().to_lowercase())
    .filter(|f| !f.is_empty());

  store
    .upsert_session(
      SessionIdentity {
        session_id:  sid.to_owned(),
        name:        post.name.clone(),
        location:    cfg.hub.location.clone(),
        mac_address: client.mac.clone(),
        fingerprint: fingerprint.clone(),
      },
      now,
    )
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let accepted = match scope {
    ChannelScope::Local => {
      let message = store
        .insert_message(NewMessage {
          ts:          now,
          channel:     post.channel.clone(),
          sender:      post.name.clone(),
          content:     post.content.clone(),
          source:      Source::Local,
          session_id:  Some(sid.to_owned()),
          fingerprint,
        })
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      tracing::info!(
        id = message.id,
        channel = %post.channel,
        len = post.content.chars().count(),
        "local post stored"
      );
      Accepted::Local { message_id: message.id }
    }
    ChannelScope::Mesh => {
      let entry = store
        .queue_outbox(NewOutboxEntry {
          ts:          now,
          channel:     post.channel.clone(),
          sender:      post.name.clone(),
          content:     post.content.clone(),
          session_id:  sid.to_owned(),
          fingerprint,
        })
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      tracing::info!(
        id = entry.id,
        channel = %post.channel,
        len = post.content.chars().count(),
        "post queued for relay"
      );
      Accepted::Queued { outbox_id: entry.id }
    }
  };

  store
    .record_post(sid, now)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(accepted)
}
