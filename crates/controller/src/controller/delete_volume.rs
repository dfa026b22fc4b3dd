use crate::provider::{to_status, ErrorClass, Operation, ProviderError, StorageProvider};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DeleteVolumeRequest {
  volume_id: String,
}

impl DeleteVolumeRequest {
  pub fn new(volume_id: impl Into<String>) -> Self {
    DeleteVolumeRequest {
      volume_id: volume_id.into(),
    }
  }

  /// The ID of the volume to be deprovisioned. This field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DeleteVolumeError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Provider error: {0}")]
  Provider(#[from] ProviderError),
}

impl From<DeleteVolumeError> for tonic::Status {
  fn from(value: DeleteVolumeError) -> tonic::Status {
    use tonic::{Code, Status};

    match value {
      DeleteVolumeError::InvalidArgument(v) => Status::new(Code::InvalidArgument, v),
      DeleteVolumeError::Provider(v) => to_status(Operation::DeleteVolume, &v),
    }
  }
}

pub(super) async fn delete<P: StorageProvider>(
  provider: &P,
  request: DeleteVolumeRequest,
) -> Result<(), DeleteVolumeError> {
  if request.volume_id.is_empty() {
    return Err(DeleteVolumeError::InvalidArgument(
      "DeleteVolumeRequest.volume_id is empty".into(),
    ));
  }

  match provider.delete_volume(&request.volume_id).await {
    Ok(()) => info!(volume_id = %request.volume_id, "deleted volume"),
    Err(err) if err.classify(Operation::DeleteVolume) == ErrorClass::NotFound => {
      debug!(volume_id = %request.volume_id, error = %err, "volume already deleted");
    }
    Err(err) => return Err(err.into()),
  }

  Ok(())
}
