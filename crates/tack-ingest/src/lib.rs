//! The typed ingest API for the Tack bulletin board.
//!
//! This is the surface the captive-portal web layer calls: post acceptance
//! with validation and rate limiting, vote casting, session bookkeeping,
//! channel feed assembly, and radio status. Every function works against any
//! [`tack_core::store::BoardStore`]. HTTP, cookies, and captive-portal
//! trickery are the caller's responsibility.
//!
//! Callers pass `now` explicitly; nothing in this crate reads the clock.

pub mod audit;
pub mod error;
pub mod feed;
pub mod post;
pub mod session;
pub mod status;
pub mod vote;

pub use error::{Error, Result};
