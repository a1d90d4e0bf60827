//! Radio status for the portal UI.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tack_core::{
  status::{HubStatus, RELAY_PROCESS, RadioStatus},
  store::BoardStore,
};

use crate::{Error, Result};

/// What clients see on the status line.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
  pub radio:     RadioStatus,
  /// The relay's last heartbeat, when one has ever been written.
  pub heartbeat: Option<HubStatus>,
}

/// Read the relay heartbeat and derive the display status.
pub async fn radio_status<S>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<StatusReport>
where
  S: BoardStore,
{
  let heartbeat = store
    .get_status(RELAY_PROCESS)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let radio = RadioStatus::from_heartbeat(heartbeat.as_ref(), now);
  Ok(StatusReport { radio, heartbeat })
}
