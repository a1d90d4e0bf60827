//! Error type for `tack-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tack_core::Error),

  /// The database stayed locked past the busy timeout. Transient; the
  /// operation can be retried as-is.
  #[error("database busy")]
  Busy,

  /// The file is corrupt or not a SQLite database. Treated as fatal when it
  /// surfaces during startup.
  #[error("database corrupt: {0}")]
  Corrupt(rusqlite::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A stored epoch-seconds value outside the representable range.
  #[error("timestamp out of range: {0}")]
  Timestamp(i64),
}

impl Error {
  pub fn is_busy(&self) -> bool {
    matches!(self, Self::Busy)
  }
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
      match code.code {
        rusqlite::ErrorCode::DatabaseBusy
        | rusqlite::ErrorCode::DatabaseLocked => return Self::Busy,
        rusqlite::ErrorCode::DatabaseCorrupt
        | rusqlite::ErrorCode::NotADatabase => return Self::Corrupt(err),
        _ => {}
      }
    }
    Self::Database(tokio_rusqlite::Error::Rusqlite(err))
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(inner) => inner.into(),
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
