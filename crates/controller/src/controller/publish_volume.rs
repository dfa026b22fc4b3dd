use crate::provider::{to_status, ErrorClass, NodeId, Operation, ProviderError, StorageProvider};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ControllerPublishVolumeRequest {
  volume_id: String,
  node_id: String,
}

impl ControllerPublishVolumeRequest {
  pub fn new(volume_id: impl Into<String>, node_id: impl Into<String>) -> Self {
    ControllerPublishVolumeRequest {
      volume_id: volume_id.into(),
      node_id: node_id.into(),
    }
  }

  /// The ID of the volume to be used on a node.
  /// This field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The ID of the node. This field is REQUIRED. The CO SHALL set this
  /// field to match the node ID returned by `NodeGetInfo`, which for this
  /// plugin is the provider's numeric node ID.
  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ControllerPublishVolumeError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  /// The node ID is not a provider node reference. Retrying cannot help.
  #[error("Malformed node id {node_id:?}: {source}")]
  MalformedNodeId {
    node_id: String,
    #[source]
    source: ParseIntError,
  },

  #[error("Provider error: {0}")]
  Provider(#[from] ProviderError),
}

impl From<ControllerPublishVolumeError> for tonic::Status {
  fn from(value: ControllerPublishVolumeError) -> Self {
    use tonic::{Code, Status};

    match value {
      ControllerPublishVolumeError::Provider(v) => to_status(Operation::Attach, &v),
      value => Status::new(Code::InvalidArgument, value.to_string()),
    }
  }
}

pub(super) async fn publish<P: StorageProvider>(
  provider: &P,
  request: ControllerPublishVolumeRequest,
) -> Result<(), ControllerPublishVolumeError> {
  if request.volume_id.is_empty() {
    return Err(ControllerPublishVolumeError::InvalidArgument(
      "ControllerPublishVolumeRequest.volume_id is empty".into(),
    ));
  }

  let node: NodeId =
    request
      .node_id
      .parse()
      .map_err(|source| ControllerPublishVolumeError::MalformedNodeId {
        node_id: request.node_id.clone(),
        source,
      })?;

  // TODO: poll the attach action until it completes instead of returning as
  // soon as the provider accepts it.
  match provider.attach(&request.volume_id, node).await {
    Ok(()) => info!(volume_id = %request.volume_id, %node, "attached volume"),
    Err(err) if err.classify(Operation::Attach) == ErrorClass::AlreadyInDesiredState => {
      info!(volume_id = %request.volume_id, %node, error = %err, "volume already attached");
    }
    Err(err) => return Err(err.into()),
  }

  Ok(())
}
