//! Radio-side daemon internals: outbox pacing, retention sweeps, the status
//! heartbeat, and the mesh link supervisor.
//!
//! The `tack-relay` binary wires these tasks onto one shared store. Every
//! task tolerates per-item failures; nothing here exits on a bad entry or a
//! dropped link.

pub mod heartbeat;
pub mod link;
pub mod retention;
pub mod scheduler;

#[cfg(test)]
mod tests;
