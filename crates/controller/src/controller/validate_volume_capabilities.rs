use crate::volume::{AccessMode, VolumeCapability};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ValidateVolumeCapabilitiesRequest {
  volume_id: String,
  volume_capabilities: Vec<VolumeCapability>,
}

impl ValidateVolumeCapabilitiesRequest {
  pub fn new(
    volume_id: impl Into<String>,
    volume_capabilities: impl IntoIterator<Item = VolumeCapability>,
  ) -> Self {
    ValidateVolumeCapabilitiesRequest {
      volume_id: volume_id.into(),
      volume_capabilities: volume_capabilities.into_iter().collect(),
    }
  }

  /// The ID of the volume to check. This field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The capabilities that the CO wants to check for the volume. This
  /// call SHALL return "confirmed" only if all the volume capabilities
  /// specified below are supported. This field is REQUIRED.
  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
  /// Volume capabilities supported by the plugin.
  volume_capabilities: Vec<VolumeCapability>,
}

impl Confirmed {
  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateVolumeCapabilitiesResponse {
  Confirmed(Confirmed),
  Message(String),
}

impl ValidateVolumeCapabilitiesResponse {
  #[inline]
  pub fn is_supported(&self) -> bool {
    matches!(self, ValidateVolumeCapabilitiesResponse::Confirmed(_))
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ValidateVolumeCapabilitiesError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),
}

impl From<ValidateVolumeCapabilitiesError> for tonic::Status {
  fn from(value: ValidateVolumeCapabilitiesError) -> Self {
    use tonic::{Code, Status};

    match value {
      ValidateVolumeCapabilitiesError::InvalidArgument(v) => Status::new(Code::InvalidArgument, v),
    }
  }
}

pub(super) fn validate(
  request: ValidateVolumeCapabilitiesRequest,
) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError> {
  if request.volume_id.is_empty() {
    return Err(ValidateVolumeCapabilitiesError::InvalidArgument(
      "ValidateVolumeCapabilitiesRequest.volume_id is empty".into(),
    ));
  }

  if request.volume_capabilities.is_empty() {
    return Err(ValidateVolumeCapabilitiesError::InvalidArgument(
      "Missing ValidateVolumeCapabilitiesRequest.volume_capabilities".into(),
    ));
  }

  // Every capability is checked so the message names all offenders.
  let unsupported: Vec<AccessMode> = request
    .volume_capabilities
    .iter()
    .map(VolumeCapability::access_mode)
    .filter(|mode| !mode.is_supported())
    .collect();

  if !unsupported.is_empty() {
    return Ok(ValidateVolumeCapabilitiesResponse::Message(format!(
      "Unsupported access modes: {:?}",
      unsupported
    )));
  }

  Ok(ValidateVolumeCapabilitiesResponse::Confirmed(Confirmed {
    volume_capabilities: request.volume_capabilities,
  }))
}
