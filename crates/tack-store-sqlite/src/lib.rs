//! SQLite backend for the Tack bulletin-board store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Two processes (the portal side and the
//! relay) share one database file; WAL journaling plus a bounded busy timeout
//! keep their writes from wedging each other.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_BUSY_TIMEOUT, SqliteStore};
