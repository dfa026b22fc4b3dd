use super::{extract_storage, UnsupportedCapacityRange};
use crate::{
  config::ControllerConfig,
  provider::{
    to_status, ListVolumeParams, Operation, Ownership, ProviderError, StorageProvider,
    VolumeCreateRequest,
  },
  units,
  volume::{CapacityRange, Volume, VolumeCapability},
};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct CreateVolumeRequest {
  name: String,
  capacity_range: Option<CapacityRange>,
  volume_capabilities: Vec<VolumeCapability>,
}

impl CreateVolumeRequest {
  pub fn new(name: impl Into<String>) -> Self {
    CreateVolumeRequest {
      name: name.into(),
      capacity_range: None,
      volume_capabilities: Vec::new(),
    }
  }

  pub fn with_capacity_range(mut self, capacity_range: CapacityRange) -> Self {
    self.capacity_range = Some(capacity_range);
    self
  }

  pub fn with_capability(mut self, capability: impl Into<VolumeCapability>) -> Self {
    self.volume_capabilities.push(capability.into());
    self
  }

  /// The suggested name for the storage space. This field is REQUIRED.
  /// It serves two purposes:
  /// 1) Idempotency - This name is generated by the CO to achieve
  ///    idempotency. Repeated calls with the same name resolve to the
  ///    same volume.
  /// 2) Suggested name - The provider stores it as the volume name.
  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// This field is OPTIONAL. This allows the CO to specify the capacity
  /// requirement of the volume to be provisioned. If not specified, the
  /// default volume size is used.
  #[inline]
  pub fn capacity_range(&self) -> Option<CapacityRange> {
    self.capacity_range
  }

  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CreateVolumeError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error(transparent)]
  UnsupportedCapacityRange(#[from] UnsupportedCapacityRange),

  /// More than one volume carries the requested name. Picking one could
  /// hand back the wrong volume, so this is never resolved automatically.
  #[error("Fatal: {count} volumes named {name:?} exist")]
  DuplicateVolumes { name: String, count: usize },

  /// A volume with the requested name exists but was not created by this
  /// plugin.
  #[error("Fatal: volume {name:?} ({volume_id}) was not created by this plugin: {description:?}")]
  VolumeNotOwned {
    name: String,
    volume_id: String,
    description: String,
  },

  #[error("Provider error: {0}")]
  Provider(#[from] ProviderError),
}

impl From<CreateVolumeError> for tonic::Status {
  fn from(value: CreateVolumeError) -> Self {
    use tonic::{Code, Status};

    let code = match &value {
      CreateVolumeError::Provider(err) => return to_status(Operation::CreateVolume, err),
      CreateVolumeError::InvalidArgument(_) => Code::InvalidArgument,
      CreateVolumeError::UnsupportedCapacityRange(_) => Code::InvalidArgument,
      CreateVolumeError::DuplicateVolumes { .. } => Code::Internal,
      CreateVolumeError::VolumeNotOwned { .. } => Code::AlreadyExists,
    };

    Status::new(code, value.to_string())
  }
}

pub(super) async fn create<P: StorageProvider>(
  provider: &P,
  config: &ControllerConfig,
  request: CreateVolumeRequest,
) -> Result<Volume, CreateVolumeError> {
  if request.name.is_empty() {
    return Err(CreateVolumeError::InvalidArgument(
      "CreateVolumeRequest.name is empty".into(),
    ));
  }

  if let Some(unsupported) = request
    .volume_capabilities
    .iter()
    .find(|c| !c.access_mode().is_supported())
  {
    return Err(CreateVolumeError::InvalidArgument(format!(
      "Unsupported access mode {:?}",
      unsupported.access_mode()
    )));
  }

  let size_gib = extract_storage(request.capacity_range)?;

  let params = ListVolumeParams {
    region: config.region.clone(),
    name: Some(request.name.clone()),
    ..Default::default()
  };
  let existing: Vec<_> = provider
    .list_volumes(&params)
    .await?
    .items
    .into_iter()
    .filter(|v| v.name == request.name)
    .collect();

  match existing.as_slice() {
    [] => (),
    [volume] => {
      if let Ownership::Foreign(description) = &volume.ownership {
        error!(name = %volume.name, volume_id = %volume.id, %description, "volume exists but is not managed by this plugin");
        return Err(CreateVolumeError::VolumeNotOwned {
          name: volume.name.clone(),
          volume_id: volume.id.clone(),
          description: description.clone(),
        });
      }

      debug!(name = %volume.name, volume_id = %volume.id, "volume already exists");
      return Ok(Volume::from(volume));
    }
    volumes => {
      error!(name = %request.name, count = volumes.len(), "duplicate volumes share one name");
      return Err(CreateVolumeError::DuplicateVolumes {
        name: request.name,
        count: volumes.len(),
      });
    }
  }

  let create = VolumeCreateRequest {
    region: config.region.clone(),
    name: request.name,
    size_gib,
    ownership: Ownership::Plugin,
  };
  let volume = provider.create_volume(&create).await?;
  info!(name = %create.name, volume_id = %volume.id, size_gib, "created volume");

  Ok(Volume::new(volume.id, units::gib_to_bytes(size_gib)))
}
