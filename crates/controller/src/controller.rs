mod capabilities;
mod capacity;
mod create_volume;
mod delete_volume;
mod get_capacity;
mod list_volumes;
mod publish_volume;
mod unpublish_volume;
mod validate_volume_capabilities;

use crate::{
  config::{ConfigError, ControllerConfig},
  provider::StorageProvider,
  utils::{record_request, record_result},
};
use async_trait::async_trait;
use tracing::instrument;

pub use crate::volume::*;
pub use capabilities::*;
pub use capacity::*;
pub use create_volume::*;
pub use delete_volume::*;
pub use get_capacity::*;
pub use list_volumes::*;
pub use publish_volume::*;
pub use unpublish_volume::*;
pub use validate_volume_capabilities::*;

#[async_trait]
pub trait ControllerService: Send + Sync + 'static {
  /// Get the set of services provided by this controller.
  #[inline]
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::empty()
  }

  /// Provision a new volume on behalf of a user.
  ///
  /// This operation MUST be idempotent. If a volume corresponding to the
  /// specified volume `name` already exists and is compatible with the
  /// request, the Plugin MUST reply with that volume.
  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, CreateVolumeError>;

  /// Deprovision a volume.
  ///
  /// This operation MUST be idempotent. If a volume corresponding to the
  /// specified volume_id does not exist or the artifacts associated with
  /// the volume do not exist anymore, the Plugin MUST reply 0 OK.
  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), DeleteVolumeError>;

  /// Make the volume available on the given node.
  ///
  /// This operation MUST be idempotent. If the volume corresponding to the
  /// volume_id has already been published at the node corresponding to the
  /// node_id, the Plugin MUST reply 0 OK.
  async fn controller_publish_volume(
    &self,
    request: ControllerPublishVolumeRequest,
  ) -> Result<(), ControllerPublishVolumeError>;

  /// Reverse of `controller_publish_volume`.
  ///
  /// This operation MUST be idempotent. If the volume corresponding to the
  /// volume_id is not attached to the node corresponding to the node_id,
  /// the Plugin MUST reply 0 OK.
  async fn controller_unpublish_volume(
    &self,
    request: ControllerUnpublishVolumeRequest,
  ) -> Result<(), ControllerUnpublishVolumeError>;

  /// Check if a volume has all the capabilities the CO wants. Confirmed
  /// only if all the volume capabilities specified in the request are
  /// supported.
  async fn validate_volume_capabilities(
    &self,
    request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError>;

  /// Return the information about all the volumes the plugin knows about.
  /// If volumes are created and/or deleted while the CO is concurrently
  /// paging through the results, it MAY witness duplicate volumes, miss
  /// existing volumes, or both.
  async fn list_volumes(
    &self,
    request: ListVolumesRequest,
  ) -> Result<ListVolumesResponse, ListVolumesError>;

  /// Query the capacity of the storage pool from which the controller
  /// provisions volumes.
  #[allow(unused_variables)]
  async fn get_capacity(
    &self,
    request: GetCapacityRequest,
  ) -> Result<GetCapacityResponse, GetCapacityError> {
    unsupported!("GetCapacity")
  }
}

/// Controller for volumes held by a remote block storage provider.
///
/// Holds no state besides the provider client and configuration, so any
/// number of requests may be served concurrently. Nothing serializes
/// requests for the same volume name: two concurrent creates of a new name
/// can both miss the existing-volume lookup and both create a volume. The
/// next create for that name then fails with
/// [`CreateVolumeError::DuplicateVolumes`].
pub struct VolumeController<P> {
  provider: P,
  config: ControllerConfig,
}

impl<P: StorageProvider> VolumeController<P> {
  pub fn new(provider: P, config: ControllerConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(VolumeController { provider, config })
  }

  #[inline]
  pub fn provider(&self) -> &P {
    &self.provider
  }

  #[inline]
  pub fn config(&self) -> &ControllerConfig {
    &self.config
  }
}

#[async_trait]
impl<P: StorageProvider> ControllerService for VolumeController<P> {
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::CREATE_DELETE_VOLUME
      | ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME
      | ControllerCapabilities::LIST_VOLUMES
      | ControllerCapabilities::GET_CAPACITY
  }

  #[instrument(
    name = "controller.create_volume",
    skip(self, request),
    fields(request, response)
  )]
  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, CreateVolumeError> {
    let request = record_request(request);
    record_result(create_volume::create(&self.provider, &self.config, request).await)
  }

  #[instrument(
    name = "controller.delete_volume",
    skip(self, request),
    fields(request)
  )]
  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), DeleteVolumeError> {
    let request = record_request(request);
    delete_volume::delete(&self.provider, request).await
  }

  #[instrument(
    name = "controller.controller_publish_volume",
    skip(self, request),
    fields(request)
  )]
  async fn controller_publish_volume(
    &self,
    request: ControllerPublishVolumeRequest,
  ) -> Result<(), ControllerPublishVolumeError> {
    let request = record_request(request);
    publish_volume::publish(&self.provider, request).await
  }

  #[instrument(
    name = "controller.controller_unpublish_volume",
    skip(self, request),
    fields(request)
  )]
  async fn controller_unpublish_volume(
    &self,
    request: ControllerUnpublishVolumeRequest,
  ) -> Result<(), ControllerUnpublishVolumeError> {
    let request = record_request(request);
    unpublish_volume::unpublish(&self.provider, request).await
  }

  #[instrument(
    name = "controller.validate_volume_capabilities",
    skip(self, request),
    fields(request, response)
  )]
  async fn validate_volume_capabilities(
    &self,
    request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError> {
    let request = record_request(request);
    record_result(validate_volume_capabilities::validate(request))
  }

  #[instrument(
    name = "controller.list_volumes",
    skip(self, request),
    fields(request, response)
  )]
  async fn list_volumes(
    &self,
    request: ListVolumesRequest,
  ) -> Result<ListVolumesResponse, ListVolumesError> {
    let request = record_request(request);
    record_result(list_volumes::list(&self.provider, &self.config, request).await)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    fake::{self, FakeProvider},
    provider::{
      ListVolumeParams, NodeId, Page, ProviderError, ProviderVolume, VolumeCreateRequest,
    },
    units::GB,
  };
  use std::{
    num::NonZeroU64,
    sync::{
      atomic::{AtomicBool, Ordering},
      Arc,
    },
    time::Duration,
  };

  fn controller(provider: FakeProvider) -> VolumeController<FakeProvider> {
    VolumeController::new(provider, ControllerConfig::new(fake::REGION)).unwrap()
  }

  #[test]
  fn empty_region_is_rejected() {
    let result = VolumeController::new(FakeProvider::new(None), ControllerConfig::new(""));
    assert_eq!(result.err(), Some(ConfigError::EmptyRegion));
  }

  #[test]
  fn advertises_static_capabilities() {
    let controller = controller(FakeProvider::new(None));
    assert_eq!(
      controller.capabilities().rpc_types(),
      vec![
        "CREATE_DELETE_VOLUME",
        "PUBLISH_UNPUBLISH_VOLUME",
        "LIST_VOLUMES",
        "GET_CAPACITY",
      ]
    );
  }

  #[tokio::test]
  async fn get_capacity_is_unimplemented() {
    let controller = controller(FakeProvider::new(None));

    let err = controller
      .get_capacity(GetCapacityRequest::new())
      .await
      .unwrap_err();
    assert_eq!(tonic::Status::from(err).code(), tonic::Code::Unimplemented);
    assert!(controller.provider().get_log().is_empty());
  }

  #[tokio::test]
  async fn volume_lifecycle() {
    let controller = controller(FakeProvider::new(None));
    let request = CreateVolumeRequest::new("vol-a")
      .with_capacity_range(CapacityRange::exact(NonZeroU64::new(16 * GB).unwrap()))
      .with_capability(AccessMode::SingleNodeWriter);

    let volume = controller.create_volume(request.clone()).await.unwrap();
    assert_eq!(volume.capacity_bytes(), 16 * (1 << 30));
    assert_eq!(
      controller.create_volume(request).await.unwrap().volume_id(),
      volume.volume_id()
    );
    assert_eq!(controller.provider().create_calls(), 1);

    let publish = ControllerPublishVolumeRequest::new(volume.volume_id(), "1001");
    controller.controller_publish_volume(publish.clone()).await.unwrap();
    controller.controller_publish_volume(publish).await.unwrap();
    assert!(controller
      .provider()
      .is_attached(volume.volume_id(), NodeId::new(1001)));

    let listed = controller
      .list_volumes(ListVolumesRequest::new(0, ""))
      .await
      .unwrap();
    assert_eq!(listed.entries().len(), 1);
    assert_eq!(listed.entries()[0].volume(), &volume);

    let unpublish = ControllerUnpublishVolumeRequest::new(volume.volume_id(), "1001");
    controller.controller_unpublish_volume(unpublish.clone()).await.unwrap();
    controller.controller_unpublish_volume(unpublish).await.unwrap();

    let delete = DeleteVolumeRequest::new(volume.volume_id());
    controller.delete_volume(delete.clone()).await.unwrap();
    controller.delete_volume(delete).await.unwrap();
    assert!(controller.provider().volumes().is_empty());
  }

  struct SetOnDrop(Arc<AtomicBool>);

  impl Drop for SetOnDrop {
    fn drop(&mut self) {
      self.0.store(true, Ordering::SeqCst);
    }
  }

  /// Provider whose attach never completes.
  struct StuckProvider {
    started: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
  }

  #[async_trait]
  impl StorageProvider for StuckProvider {
    async fn list_volumes(
      &self,
      _: &ListVolumeParams,
    ) -> Result<Page<ProviderVolume>, ProviderError> {
      Ok(Page {
        items: Vec::new(),
        links: None,
      })
    }

    async fn create_volume(
      &self,
      _: &VolumeCreateRequest,
    ) -> Result<ProviderVolume, ProviderError> {
      Err(ProviderError::http(500, "unused"))
    }

    async fn delete_volume(&self, _: &str) -> Result<(), ProviderError> {
      Ok(())
    }

    async fn attach(&self, _: &str, _: NodeId) -> Result<(), ProviderError> {
      let _guard = SetOnDrop(self.dropped.clone());
      self.started.store(true, Ordering::SeqCst);
      std::future::pending::<()>().await;
      Ok(())
    }

    async fn detach(&self, _: &str, _: NodeId) -> Result<(), ProviderError> {
      Ok(())
    }
  }

  #[tokio::test]
  async fn dropping_request_cancels_provider_call() {
    let started = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let controller = VolumeController::new(
      StuckProvider {
        started: started.clone(),
        dropped: dropped.clone(),
      },
      ControllerConfig::new(fake::REGION),
    )
    .unwrap();

    let result = tokio::time::timeout(
      Duration::from_millis(20),
      controller.controller_publish_volume(ControllerPublishVolumeRequest::new("vol-1", "1")),
    )
    .await;

    assert!(result.is_err(), "publish should have timed out");
    assert!(started.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst));
  }
}
