//! Vote types.
//!
//! Votes are keyed by (message, session); a session holds at most one vote
//! per message and may change or withdraw it at any time.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── VoteKind ────────────────────────────────────────────────────────────────

/// The direction of a recorded vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
  Up,
  Down,
}

impl VoteKind {
  /// The signed value stored in the `vote_type` column.
  pub fn as_signed(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }

  pub fn from_signed(v: i64) -> Result<Self> {
    match v {
      1 => Ok(Self::Up),
      -1 => Ok(Self::Down),
      other => Err(Error::VoteOutOfRange(other)),
    }
  }
}

// ─── VoteChoice ──────────────────────────────────────────────────────────────

/// A caller's requested vote state: up, down, or no vote at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
  Up,
  Down,
  /// Withdraw any existing vote.
  Clear,
}

impl VoteChoice {
  /// Decode the portal's wire encoding (`1`, `-1`, `0`).
  pub fn from_signed(v: i64) -> Result<Self> {
    match v {
      1 => Ok(Self::Up),
      -1 => Ok(Self::Down),
      0 => Ok(Self::Clear),
      other => Err(Error::VoteOutOfRange(other)),
    }
  }

  pub fn as_signed(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
      Self::Clear => 0,
    }
  }

  /// The vote to record, or `None` for a withdrawal.
  pub fn kind(self) -> Option<VoteKind> {
    match self {
      Self::Up => Some(VoteKind::Up),
      Self::Down => Some(VoteKind::Down),
      Self::Clear => None,
    }
  }
}

// ─── VoteCounts ──────────────────────────────────────────────────────────────

/// Denormalised tallies carried on a message row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
  pub up:   i64,
  pub down: i64,
}
