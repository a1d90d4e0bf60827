//! Error types for `tack-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The named channel is not in this hub's configuration.
  #[error("unknown channel: {0:?}")]
  UnknownChannel(String),

  #[error("unknown message source: {0:?}")]
  UnknownSource(String),

  #[error("vote value out of range: {0}")]
  VoteOutOfRange(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
