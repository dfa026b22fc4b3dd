//! The slice of the storage provider's API the controller depends on.

mod error;

use async_trait::async_trait;
use std::{fmt, num::ParseIntError, str::FromStr};

pub(crate) use error::to_status;
pub use error::{ErrorClass, Operation, ProviderError};

/// Description stamped on every volume this plugin creates. It is the only
/// durable marker separating plugin-managed volumes from ones created
/// out-of-band, so it must never change.
pub const OWNERSHIP_SENTINEL: &str = "Created by DigitalOcean CSI driver";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
  Plugin,
  Foreign(String),
}

impl Ownership {
  pub fn from_description(description: &str) -> Self {
    if description == OWNERSHIP_SENTINEL {
      Ownership::Plugin
    } else {
      Ownership::Foreign(description.to_owned())
    }
  }

  #[inline]
  pub fn is_plugin(&self) -> bool {
    matches!(self, Ownership::Plugin)
  }

  /// The description the provider stores for this owner.
  pub fn description(&self) -> &str {
    match self {
      Ownership::Plugin => OWNERSHIP_SENTINEL,
      Ownership::Foreign(description) => description,
    }
  }
}

/// A volume as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderVolume {
  pub id: String,
  pub name: String,
  pub region: String,
  pub size_gib: u64,
  pub ownership: Ownership,
}

/// Provider-native reference to a compute node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
  #[inline]
  pub fn new(id: u64) -> Self {
    NodeId(id)
  }

  #[inline]
  pub fn get(self) -> u64 {
    self.0
  }
}

impl FromStr for NodeId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse().map(NodeId)
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListVolumeParams {
  pub region: String,
  pub name: Option<String>,
  /// 1-based page number. `None` lets the provider pick the first page.
  pub page: Option<u32>,
  pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCreateRequest {
  pub region: String,
  pub name: String,
  pub size_gib: u64,
  pub ownership: Ownership,
}

/// Link metadata attached to a paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLinks {
  /// The page this response holds.
  pub current: u32,
  /// Last page of the collection. The provider omits it on the last page.
  pub last: Option<u32>,
}

impl PageLinks {
  #[inline]
  pub fn is_last_page(&self) -> bool {
    match self.last {
      None => true,
      Some(last) => self.current >= last,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub links: Option<PageLinks>,
}

/// Client for the remote block storage API.
///
/// Implementations must be cancel safe: the controller drops the returned
/// future when its caller gives up on a request.
#[async_trait]
pub trait StorageProvider: Send + Sync + 'static {
  async fn list_volumes(
    &self,
    params: &ListVolumeParams,
  ) -> Result<Page<ProviderVolume>, ProviderError>;

  async fn create_volume(
    &self,
    request: &VolumeCreateRequest,
  ) -> Result<ProviderVolume, ProviderError>;

  async fn delete_volume(&self, volume_id: &str) -> Result<(), ProviderError>;

  async fn attach(&self, volume_id: &str, node: NodeId) -> Result<(), ProviderError>;

  async fn detach(&self, volume_id: &str, node: NodeId) -> Result<(), ProviderError>;
}
