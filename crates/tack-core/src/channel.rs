//! Channel identity and scope.
//!
//! Mesh channels are identified on the air by their position in the
//! configured list; the name itself never travels. Local channels exist only
//! on the WiFi side of the bridge.

use crate::{Error, Result};

// ─── ChannelScope ────────────────────────────────────────────────────────────

/// Which side of the bridge a channel lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelScope {
  /// Relayed over the radio; the slot index is the position in the
  /// configured list.
  Mesh,
  /// WiFi-only; posts are stored directly and never queued.
  Local,
}

// ─── ChannelMap ──────────────────────────────────────────────────────────────

/// The hub's configured channel set.
///
/// A name appearing in both lists routes as local.
#[derive(Debug, Clone)]
pub struct ChannelMap {
  mesh:  Vec<String>,
  local: Vec<String>,
}

impl ChannelMap {
  pub fn new(mesh: Vec<String>, local: Vec<String>) -> Self {
    Self { mesh, local }
  }

  /// Scope of `name`, or `None` for a channel this hub does not carry.
  pub fn scope(&self, name: &str) -> Option<ChannelScope> {
    if self.local.iter().any(|c| c == name) {
      Some(ChannelScope::Local)
    } else if self.mesh.iter().any(|c| c == name) {
      Some(ChannelScope::Mesh)
    } else {
      None
    }
  }

  pub fn is_known(&self, name: &str) -> bool {
    self.scope(name).is_some()
  }

  /// Radio slot for a mesh channel name.
  pub fn mesh_index(&self, name: &str) -> Option<usize> {
    self.mesh.iter().position(|c| c == name)
  }

  pub fn require_mesh_index(&self, name: &str) -> Result<usize> {
    self
      .mesh_index(name)
      .ok_or_else(|| Error::UnknownChannel(name.to_owned()))
  }

  /// Display name for an inbound slot. Slots this hub has no name for still
  /// get a synthetic one so their traffic is not dropped.
  pub fn name_for_slot(&self, idx: usize) -> String {
    match self.mesh.get(idx) {
      Some(name) => name.clone(),
      None => format!("#channel-{idx}"),
    }
  }

  pub fn mesh(&self) -> &[String] {
    &self.mesh
  }

  pub fn local(&self) -> &[String] {
    &self.local
  }

  /// Every channel this hub carries, mesh first, deduplicated. Retention
  /// passes iterate over this.
  pub fn all(&self) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for name in self.mesh.iter().chain(self.local.iter()) {
      if !seen.contains(&name.as_str()) {
        seen.push(name.as_str());
      }
    }
    seen
  }
}
