use crate::{units, volume::CapacityRange};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported capacity range: required_bytes={required_bytes}, limit_bytes={limit_bytes}")]
pub struct UnsupportedCapacityRange {
  pub required_bytes: u64,
  pub limit_bytes: u64,
}

impl From<CapacityRange> for UnsupportedCapacityRange {
  fn from(range: CapacityRange) -> Self {
    UnsupportedCapacityRange {
      required_bytes: range.required_bytes(),
      limit_bytes: range.limit_bytes(),
    }
  }
}

/// Resolve the size, in GiB, to provision for `range`.
///
/// Only exact sizes are supported when both bounds are given. Without a
/// range the default volume size is used.
pub fn extract_storage(range: Option<CapacityRange>) -> Result<u64, UnsupportedCapacityRange> {
  let range = match range {
    None => return Ok(units::bytes_to_gib(units::DEFAULT_VOLUME_SIZE)),
    Some(range) => range,
  };

  match range {
    CapacityRange::Between(required, limit) if required == limit => {
      Ok(units::bytes_to_gib(required.get()))
    }
    CapacityRange::Between(..) => Err(range.into()),
    CapacityRange::AtLeast(required) => Ok(units::bytes_to_gib_ceil(required.get())),
    CapacityRange::AtMost(limit) => match units::bytes_to_gib(limit.get()) {
      0 => Err(range.into()),
      gib => Ok(gib),
    },
  }
}
