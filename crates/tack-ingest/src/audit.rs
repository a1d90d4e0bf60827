//! The rate-limited security audit sink.
//!
//! Security-relevant rejections are logged to the dedicated `audit` tracing
//! target, separate from the operational log, so operators can tail abuse
//! without wading through request noise. A small in-process limiter keyed by
//! (event, ip, mac) caps emissions per window so a hostile client cannot
//! flood the log; suppressed events still advance the counter.
//!
//! Untrusted fields pass through [`sanitize`] before emission. Message
//! bodies are never logged here — lengths only.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Emissions allowed per key per window.
pub const AUDIT_LIMIT: u32 = 20;
/// Window length in seconds.
pub const AUDIT_WINDOW_SECS: i64 = 60;

const SANITIZE_MAX_CHARS: usize = 500;

// ─── ClientInfo ──────────────────────────────────────────────────────────────

/// Connection metadata the web layer learned about a client.
///
/// Used for audit context and MAC bookkeeping, never for authorization.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
  pub ip:  Option<String>,
  /// From the hub's neighbour table; absent when the lookup failed.
  pub mac: Option<String>,
}

impl ClientInfo {
  pub fn new(ip: impl Into<String>) -> Self {
    Self { ip: Some(ip.into()), mac: None }
  }

  pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
    self.mac = Some(mac.into());
    self
  }
}

// ─── AuditEvent ──────────────────────────────────────────────────────────────

/// What happened, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEvent {
  CookieValidationFailed,
  MacMismatch,
  InvalidName,
  RateLimitExceeded,
  VoteFailed,
  FingerprintUpdateFailed,
}

impl AuditEvent {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::CookieValidationFailed => "cookie_validation_failed",
      Self::MacMismatch => "mac_mismatch",
      Self::InvalidName => "invalid_name",
      Self::RateLimitExceeded => "rate_limit_exceeded",
      Self::VoteFailed => "vote_failed",
      Self::FingerprintUpdateFailed => "fingerprint_update_failed",
    }
  }
}

// ─── AuditSink ───────────────────────────────────────────────────────────────

struct Bucket {
  start: DateTime<Utc>,
  count: u32,
}

/// Rate-limited sink for security events.
pub struct AuditSink {
  limit:   u32,
  window:  Duration,
  buckets: Mutex<HashMap<(AuditEvent, String, String), Bucket>>,
}

impl Default for AuditSink {
  fn default() -> Self {
    Self::new()
  }
}

impl AuditSink {
  pub fn new() -> Self {
    Self::with_limit(AUDIT_LIMIT, Duration::seconds(AUDIT_WINDOW_SECS))
  }

  pub fn with_limit(limit: u32, window: Duration) -> Self {
    Self { limit, window, buckets: Mutex::new(HashMap::new()) }
  }

  /// Record a security event.
  ///
  /// Returns whether it was emitted; `false` means the (event, ip, mac) key
  /// is over its window allowance and the event was only counted.
  pub fn record(
    &self,
    event: AuditEvent,
    client: &ClientInfo,
    session_id: Option<&str>,
    detail: &str,
    now: DateTime<Utc>,
  ) -> bool {
    let ip = client.ip.as_deref().unwrap_or("");
    let mac = client.mac.as_deref().unwrap_or("");

    {
      let mut buckets = self.buckets.lock();
      let bucket = buckets
        .entry((event, ip.to_owned(), mac.to_owned()))
        .or_insert(Bucket { start: now, count: 0 });
      if now - bucket.start > self.window {
        bucket.start = now;
        bucket.count = 0;
      }
      bucket.count += 1;
      if bucket.count > self.limit {
        return false;
      }
    }

    tracing::warn!(
      target: "audit",
      event = event.as_str(),
      ip = %sanitize(ip),
      mac = %sanitize(mac),
      session = %sanitize(session_id.unwrap_or("")),
      "{}",
      sanitize(detail),
    );
    true
  }
}

// ─── Sanitizer ───────────────────────────────────────────────────────────────

/// Make an untrusted string safe to log: CR/LF/TAB become spaces
/// (log-injection), and overlong values are truncated with an ellipsis.
pub fn sanitize(value: &str) -> String {
  let cleaned: String = value
    .chars()
    .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
    .collect();
  if cleaned.chars().count() > SANITIZE_MAX_CHARS {
    let mut out: String =
      cleaned.chars().take(SANITIZE_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
  } else {
    cleaned
  }
}
