use std::num::NonZeroU64;
use thiserror::Error;

#[derive(Debug, Clone, Default)]
pub struct GetCapacityRequest {}

impl GetCapacityRequest {
  #[inline]
  pub fn new() -> Self {
    GetCapacityRequest {}
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCapacityResponse {
  /// The available capacity, in bytes, of the storage that can be used
  /// to provision volumes. This field is REQUIRED.
  available_capacity: NonZeroU64,
}

impl GetCapacityResponse {
  #[inline]
  pub fn new(available_capacity: NonZeroU64) -> Self {
    GetCapacityResponse { available_capacity }
  }

  #[inline]
  pub fn available_capacity(&self) -> NonZeroU64 {
    self.available_capacity
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GetCapacityError {
  #[error(transparent)]
  #[doc(hidden)]
  Other(#[from] tonic::Status),
}

impl From<GetCapacityError> for tonic::Status {
  fn from(value: GetCapacityError) -> Self {
    match value {
      GetCapacityError::Other(v) => v,
    }
  }
}
