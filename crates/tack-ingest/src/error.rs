//! Error type for the ingest surface.

use thiserror::Error;

/// A rejection returned to the web layer.
///
/// Everything here except `Store` is a caller-side rejection: nothing was
/// written, and the client gets a 4xx-shaped answer. `Store` wraps whatever
/// the backing [`tack_core::store::BoardStore`] produced.
#[derive(Debug, Error)]
pub enum Error {
  /// The request named a channel this hub does not carry.
  #[error("invalid channel: {0}")]
  UnknownChannel(String),

  /// A field failed validation; the message is safe to show the client.
  #[error("{0}")]
  Validation(String),

  /// The session is over its posting allowance for the current window.
  #[error("rate limit exceeded: {posted} posts this window (limit {limit})")]
  RateLimited { posted: i64, limit: i64 },

  /// Authors may not vote on their own posts.
  #[error("cannot vote on your own post")]
  OwnMessage,

  /// The referenced message does not exist.
  #[error("message {0} not found")]
  NotFound(i64),

  /// No session cookie, or a cookie naming a session this hub has never
  /// seen. The payload is the offered id, empty when absent.
  #[error("session invalid")]
  UnknownSession(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
