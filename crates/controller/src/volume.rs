use crate::{provider::ProviderVolume, units};
use std::num::NonZeroU64;

/// A volume as reported back to the CO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
  volume_id: String,
  capacity_bytes: Option<NonZeroU64>,
}

impl Volume {
  pub fn new(volume_id: impl Into<String>, capacity_bytes: u64) -> Self {
    Volume {
      volume_id: volume_id.into(),
      capacity_bytes: NonZeroU64::new(capacity_bytes),
    }
  }

  /// The identifier for this volume, generated by the provider. This
  /// field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The capacity of the volume in bytes. `0` means unknown.
  #[inline]
  pub fn capacity_bytes(&self) -> u64 {
    self.capacity_bytes.map_or(0, NonZeroU64::get)
  }
}

impl From<&ProviderVolume> for Volume {
  fn from(value: &ProviderVolume) -> Self {
    Volume::new(value.id.clone(), units::gib_to_bytes(value.size_gib))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AccessMode {
  Unknown,
  /// Can only be published once as read/write on a single node, at
  /// any given time.
  SingleNodeWriter,
  /// Can only be published once as readonly on a single node, at
  /// any given time.
  SingleNodeReaderOnly,
  /// Can be published as readonly at multiple nodes simultaneously.
  MultiNodeReaderOnly,
  /// Can be published at multiple nodes simultaneously. Only one of
  /// the node can be used as read/write. The rest will be readonly.
  MultiNodeSingleWriter,
  /// Can be published as read/write at multiple nodes
  /// simultaneously.
  MultiNodeMultiWriter,
}

/// The only access mode the provider supports: a block volume attaches to
/// one node at a time, read/write.
pub const SUPPORTED_ACCESS_MODES: &[AccessMode] = &[AccessMode::SingleNodeWriter];

impl AccessMode {
  #[inline]
  pub fn is_supported(self) -> bool {
    SUPPORTED_ACCESS_MODES.contains(&self)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCapability {
  access_mode: AccessMode,
}

impl VolumeCapability {
  #[inline]
  pub fn new(access_mode: AccessMode) -> Self {
    VolumeCapability { access_mode }
  }

  /// This is a REQUIRED field.
  #[inline]
  pub fn access_mode(&self) -> AccessMode {
    self.access_mode
  }
}

impl From<AccessMode> for VolumeCapability {
  #[inline]
  fn from(access_mode: AccessMode) -> Self {
    VolumeCapability::new(access_mode)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityRange {
  AtLeast(NonZeroU64),
  AtMost(NonZeroU64),
  /// Effectively AtLeast(.0) & AtMost(.1)
  Between(NonZeroU64, NonZeroU64),
}

impl CapacityRange {
  /// Build a range from the CO's `required_bytes` / `limit_bytes` pair,
  /// where `0` means "not set". Returns `None` when neither bound is set.
  pub fn new(required_bytes: u64, limit_bytes: u64) -> Option<Self> {
    match (NonZeroU64::new(required_bytes), NonZeroU64::new(limit_bytes)) {
      (None, None) => None,
      (Some(r), None) => Some(CapacityRange::AtLeast(r)),
      (None, Some(l)) => Some(CapacityRange::AtMost(l)),
      (Some(r), Some(l)) => Some(CapacityRange::Between(r, l)),
    }
  }

  /// Both bounds set to `bytes`.
  pub fn exact(bytes: NonZeroU64) -> Self {
    CapacityRange::Between(bytes, bytes)
  }

  #[inline]
  pub fn required_bytes(&self) -> u64 {
    match self {
      CapacityRange::AtLeast(r) | CapacityRange::Between(r, _) => r.get(),
      CapacityRange::AtMost(_) => 0,
    }
  }

  #[inline]
  pub fn limit_bytes(&self) -> u64 {
    match self {
      CapacityRange::AtMost(l) | CapacityRange::Between(_, l) => l.get(),
      CapacityRange::AtLeast(_) => 0,
    }
  }
}
