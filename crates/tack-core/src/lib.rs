//! Core types and trait definitions for the Tack bulletin board.
//!
//! This crate is deliberately free of database and radio-driver dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod outbox;
pub mod radio;
pub mod session;
pub mod status;
pub mod store;
pub mod vote;

pub use error::{Error, Result};
