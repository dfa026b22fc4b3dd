use crate::provider::{to_status, ErrorClass, NodeId, Operation, ProviderError, StorageProvider};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ControllerUnpublishVolumeRequest {
  volume_id: String,
  node_id: String,
}

impl ControllerUnpublishVolumeRequest {
  pub fn new(volume_id: impl Into<String>, node_id: impl Into<String>) -> Self {
    ControllerUnpublishVolumeRequest {
      volume_id: volume_id.into(),
      node_id: node_id.into(),
    }
  }

  /// The ID of the volume. This field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The ID of the node the volume is detached from. This field is
  /// REQUIRED.
  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ControllerUnpublishVolumeError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Malformed node id {node_id:?}: {source}")]
  MalformedNodeId {
    node_id: String,
    #[source]
    source: ParseIntError,
  },

  #[error("Provider error: {0}")]
  Provider(#[from] ProviderError),
}

impl From<ControllerUnpublishVolumeError> for tonic::Status {
  fn from(value: ControllerUnpublishVolumeError) -> Self {
    use tonic::{Code, Status};

    match value {
      ControllerUnpublishVolumeError::Provider(v) => to_status(Operation::Detach, &v),
      value => Status::new(Code::InvalidArgument, value.to_string()),
    }
  }
}

pub(super) async fn unpublish<P: StorageProvider>(
  provider: &P,
  request: ControllerUnpublishVolumeRequest,
) -> Result<(), ControllerUnpublishVolumeError> {
  if request.volume_id.is_empty() {
    return Err(ControllerUnpublishVolumeError::InvalidArgument(
      "ControllerUnpublishVolumeRequest.volume_id is empty".into(),
    ));
  }

  let node: NodeId =
    request
      .node_id
      .parse()
      .map_err(|source| ControllerUnpublishVolumeError::MalformedNodeId {
        node_id: request.node_id.clone(),
        source,
      })?;

  match provider.detach(&request.volume_id, node).await {
    Ok(()) => info!(volume_id = %request.volume_id, %node, "detached volume"),
    Err(err) if err.classify(Operation::Detach) == ErrorClass::AlreadyInDesiredState => {
      info!(volume_id = %request.volume_id, %node, error = %err, "volume already detached");
    }
    Err(err) => return Err(err.into()),
  }

  Ok(())
}
