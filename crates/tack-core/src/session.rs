//! Session types — advisory identity for captive-portal clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Session ─────────────────────────────────────────────────────────────────

/// A captive-portal browser session.
///
/// Sessions carry no secrets and grant no privilege; they exist so posts have
/// a stable author for rate limiting and voting. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id:      String,
  pub name:            String,
  pub location:        String,
  /// Advisory metadata. Modern clients rotate randomised MACs, so a changed
  /// MAC is an audit event and a refresh, never a rejection.
  pub mac_address:     Option<String>,
  /// Opaque client hint, when the portal has collected one.
  pub fingerprint:     Option<String>,
  pub created_ts:      DateTime<Utc>,
  pub last_post_ts:    Option<DateTime<Utc>>,
  /// Posts charged to the current rate window.
  pub post_count_hour: i64,
}

// ─── SessionIdentity ─────────────────────────────────────────────────────────

/// Input to [`crate::store::BoardStore::upsert_session`] — the identity
/// fields refreshed on contact.
///
/// `name` and `location` always overwrite; `mac_address` and `fingerprint`
/// leave the stored value in place when `None`.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
  pub session_id:  String,
  pub name:        String,
  pub location:    String,
  pub mac_address: Option<String>,
  pub fingerprint: Option<String>,
}
