//! Session bookkeeping — registration, cookie resolution, fingerprints,
//! posting allowance.
//!
//! Sessions are advisory identity, not authentication: they exist so posts
//! have a stable author for rate limiting and voting. A changed MAC is an
//! audit event plus a refresh of the stored value, never a rejection —
//! modern clients rotate randomised MACs on reconnect, and abuse is handled
//! by rate limiting, not MAC pinning.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tack_core::{
  config::{Limits, RATE_WINDOW_SECS},
  session::{Session, SessionIdentity},
  store::BoardStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  audit::{AuditEvent, AuditSink, ClientInfo},
};

/// Mint the opaque token the portal sets as a session cookie.
pub fn new_session_id() -> String {
  Uuid::new_v4().to_string()
}

/// Look up a session, creating a blank one on first contact.
///
/// New sessions start with an empty name and the hub's location; the client
/// fills the name in with their first post.
pub async fn register_session<S>(
  store: &S,
  hub_location: &str,
  client: &ClientInfo,
  session_id: &str,
  now: DateTime<Utc>,
) -> Result<Session>
where
  S: BoardStore,
{
  if let Some(session) = store
    .get_session(session_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  {
    return Ok(session);
  }

  store
    .upsert_session(
      SessionIdentity {
        session_id:  session_id.to_owned(),
        name:        String::new(),
        location:    hub_location.to_owned(),
        mac_address: client.mac.clone(),
        fingerprint: None,
      },
      now,
    )
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  store
    .get_session(session_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::UnknownSession(session_id.to_owned()))
}

/// Resolve the session named by a request cookie.
///
/// A missing or unknown cookie is audited and rejected. A MAC that differs
/// from the stored one is audited, the stored MAC refreshed, and the
/// session accepted.
pub async fn resolve_session<S>(
  store: &S,
  hub_location: &str,
  audit: &AuditSink,
  client: &ClientInfo,
  session_id: Option<&str>,
  now: DateTime<Utc>,
) -> Result<Session>
where
  S: BoardStore,
{
  let Some(sid) = session_id.filter(|s| !s.is_empty()) else {
    audit.record(
      AuditEvent::CookieValidationFailed,
      client,
      None,
      "missing cookie",
      now,
    );
    return Err(Error::UnknownSession(String::new()));
  };

  let Some(mut session) = store
    .get_session(sid)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  else {
    audit.record(
      AuditEvent::CookieValidationFailed,
      client,
      Some(sid),
      "unknown session",
      now,
    );
    return Err(Error::UnknownSession(sid.to_owned()));
  };

  let drifted = match (&session.mac_address, &client.mac) {
    (Some(stored), Some(current)) => {
      !stored.is_empty()
        && !current.is_empty()
        && !stored.eq_ignore_ascii_case(current)
    }
    _ => false,
  };
  if drifted {
    audit.record(AuditEvent::MacMismatch, client, Some(sid), "MAC changed", now);
    let location = if session.location.is_empty() {
      hub_location.to_owned()
    } else {
      session.location.clone()
    };
    let refreshed = SessionIdentity {
      session_id:  sid.to_owned(),
      name:        session.name.clone(),
      location,
      mac_address: client.mac.clone(),
      fingerprint: None,
    };
    // A failed refresh is logged but does not reject the request.
    match store.upsert_session(refreshed, now).await {
      Ok(()) => session.mac_address = client.mac.clone(),
      Err(err) => {
        tracing::warn!(session = sid, error = %err, "mac refresh failed");
      }
    }
  }

  Ok(session)
}

/// Attach a 40-hex-char client fingerprint to a session.
pub async fn set_fingerprint<S>(
  store: &S,
  audit: &AuditSink,
  client: &ClientInfo,
  session_id: &str,
  fingerprint: &str,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: BoardStore,
{
  let fp = fingerprint.trim().to_lowercase();
  if fp.len() != 40 || hex::decode(&fp).is_err() {
    return Err(Error::Validation("invalid fingerprint".into()));
  }

  if let Err(err) = store.update_session_fingerprint(session_id, &fp).await {
    audit.record(
      AuditEvent::FingerprintUpdateFailed,
      client,
      Some(session_id),
      "fingerprint update failed",
      now,
    );
    return Err(Error::Store(Box::new(err)));
  }
  Ok(())
}

// ─── Allowance ───────────────────────────────────────────────────────────────

/// What the session may still post this window, for the portal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostAllowance {
  pub posted:      i64,
  pub limit:       i64,
  pub remaining:   i64,
  pub window_secs: i64,
}

pub async fn post_allowance<S>(
  store: &S,
  limits: &Limits,
  session_id: &str,
  now: DateTime<Utc>,
) -> Result<PostAllowance>
where
  S: BoardStore,
{
  let posted = store
    .posts_in_window(session_id, Duration::seconds(RATE_WINDOW_SECS), now)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let limit = limits.posts_per_hour;
  Ok(PostAllowance {
    posted,
    limit,
    remaining: (limit - posted).max(0),
    window_secs: RATE_WINDOW_SECS,
  })
}
