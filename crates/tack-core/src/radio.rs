//! The radio-link capability boundary.
//!
//! The real driver (serial LoRa hardware, its handshake and framing) lives
//! outside this repo. Everything radio-facing is written against this trait,
//! so the relay can run against a scripted link in tests and against
//! [`NullLink`] on hardware-less development machines.

use std::future::Future;

use thiserror::Error;

/// Length of a channel's shared secret, in bytes.
pub const CHANNEL_SECRET_LEN: usize = 16;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failures surfaced by a radio link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
  /// The link is down: not connected, or the transport vanished mid-call.
  #[error("radio link unavailable")]
  Unavailable,

  /// The driver accepted the call but the radio rejected it.
  #[error("radio rejected request: {0}")]
  Rejected(String),
}

pub type LinkResult<T> = std::result::Result<T, LinkError>;

// ─── Events ──────────────────────────────────────────────────────────────────

/// Inbound traffic surfaced by a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
  /// A message heard on a channel slot.
  ChannelMessage {
    channel_idx: usize,
    sender:      String,
    text:        String,
  },
  /// A direct message addressed to this node.
  DirectMessage {
    /// Key prefix identifying the sender; valid as a reply destination.
    sender: String,
    text:   String,
  },
}

// ─── RadioLink ───────────────────────────────────────────────────────────────

/// Capability interface to the mesh radio.
///
/// A skipped or failed call must never wedge the link as a whole: the relay
/// treats every error as retryable and decides pacing itself. All methods
/// return `Send` futures so the trait can be driven from spawned tasks.
pub trait RadioLink: Send + Sync {
  /// Bring the link up: open the transport and apply radio parameters.
  fn connect(&self) -> impl Future<Output = LinkResult<()>> + Send + '_;

  /// Program a channel slot with its display name and shared secret.
  fn set_channel<'a>(
    &'a self,
    idx: usize,
    name: &'a str,
    secret: [u8; CHANNEL_SECRET_LEN],
  ) -> impl Future<Output = LinkResult<()>> + Send + 'a;

  /// Broadcast `text` on a channel slot.
  fn send_channel_message<'a>(
    &'a self,
    idx: usize,
    text: &'a str,
  ) -> impl Future<Output = LinkResult<()>> + Send + 'a;

  /// Send a direct reply to `dest`, a key prefix from a received DM.
  fn send_direct_message<'a>(
    &'a self,
    dest: &'a str,
    text: &'a str,
  ) -> impl Future<Output = LinkResult<()>> + Send + 'a;

  /// The next inbound event. `None` means the link is gone and must be
  /// connected again before anything else is called.
  fn recv(&self) -> impl Future<Output = Option<RadioEvent>> + Send + '_;
}

// ─── NullLink ────────────────────────────────────────────────────────────────

/// A link with no radio behind it: never connects, never yields events.
///
/// Running the relay against this keeps the WiFi side of a hub fully
/// functional while the status surface reports the radio offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLink;

impl RadioLink for NullLink {
  async fn connect(&self) -> LinkResult<()> {
    Err(LinkError::Unavailable)
  }

  async fn set_channel(
    &self,
    _idx: usize,
    _name: &str,
    _secret: [u8; CHANNEL_SECRET_LEN],
  ) -> LinkResult<()> {
    Err(LinkError::Unavailable)
  }

  async fn send_channel_message(
    &self,
    _idx: usize,
    _text: &str,
  ) -> LinkResult<()> {
    Err(LinkError::Unavailable)
  }

  async fn send_direct_message(
    &self,
    _dest: &str,
    _text: &str,
  ) -> LinkResult<()> {
    Err(LinkError::Unavailable)
  }

  async fn recv(&self) -> Option<RadioEvent> {
    std::future::pending().await
  }
}
