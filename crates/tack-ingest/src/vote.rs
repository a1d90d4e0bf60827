//! Vote casting with the own-post rule.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tack_core::{
  store::BoardStore,
  vote::{VoteChoice, VoteCounts, VoteKind},
};

use crate::{
  Error, Result,
  audit::{AuditEvent, AuditSink, ClientInfo},
};

/// The state of a message's tallies after a vote, as shown to the voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
  pub message_id:  i64,
  pub counts:      VoteCounts,
  /// The vote the caller now holds, `None` after a withdrawal.
  pub viewer_vote: Option<VoteKind>,
}

/// Set, change, or withdraw the session's vote on a message.
///
/// Authors may not vote on their own posts, though they may withdraw a
/// stray vote. Voting on a missing message is an error; nothing is written.
pub async fn cast_vote<S>(
  store: &S,
  audit: &AuditSink,
  client: &ClientInfo,
  session_id: &str,
  message_id: i64,
  choice: VoteChoice,
  now: DateTime<Utc>,
) -> Result<VoteReceipt>
where
  S: BoardStore,
{
  let message = store
    .get_message(message_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound(message_id))?;

  if choice != VoteChoice::Clear
    && message.session_id.as_deref() == Some(session_id)
  {
    return Err(Error::OwnMessage);
  }

  let counts: VoteCounts = match store
    .set_vote(message_id, session_id, choice, now)
    .await
  {
    Ok(counts) => counts,
    Err(err) => {
      audit.record(
        AuditEvent::VoteFailed,
        client,
        Some(session_id),
        "vote failed",
        now,
      );
      return Err(Error::Store(Box::new(err)));
    }
  };

  Ok(VoteReceipt { message_id, counts, viewer_vote: choice.kind() })
}
