use crate::provider::{
  ListVolumeParams, NodeId, Operation, Ownership, Page, PageLinks, ProviderError, ProviderVolume,
  StorageProvider, VolumeCreateRequest,
};
use async_trait::async_trait;
use std::{
  collections::{HashMap, HashSet, VecDeque},
  sync::Mutex,
};

pub const REGION: &str = "nyc3";

const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeAction {
  ListVolumes(ListVolumeParams),
  CreateVolume(VolumeCreateRequest),
  DeleteVolume(String),
  Attach { volume_id: String, node: NodeId },
  Detach { volume_id: String, node: NodeId },
}

struct FakeProviderInner {
  volumes: Vec<ProviderVolume>,
  attachments: HashSet<(String, NodeId)>,
  next_id: usize,
  default_per_page: u32,
  failures: HashMap<Operation, VecDeque<ProviderError>>,
  log: Vec<FakeAction>,
}

impl FakeProviderInner {
  fn call(&mut self, action: FakeAction, operation: Operation) -> Result<(), ProviderError> {
    self.log.push(action);
    match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

/// In-memory provider with the same paging and error behaviour as the real
/// API. Every call is logged, and failures can be queued per operation.
pub struct FakeProvider(Mutex<FakeProviderInner>);

pub fn volume(id: &str, name: &str, size_gib: u64) -> ProviderVolume {
  ProviderVolume {
    id: id.into(),
    name: name.into(),
    region: REGION.into(),
    size_gib,
    ownership: Ownership::Plugin,
  }
}

impl FakeProvider {
  pub fn new(volumes: impl IntoIterator<Item = ProviderVolume>) -> Self {
    let volumes: Vec<_> = volumes.into_iter().collect();
    let inner = FakeProviderInner {
      next_id: volumes.len() + 1,
      volumes,
      attachments: HashSet::new(),
      default_per_page: DEFAULT_PER_PAGE,
      failures: HashMap::new(),
      log: Vec::new(),
    };

    Self(Mutex::new(inner))
  }

  pub fn with_default_per_page(self, per_page: u32) -> Self {
    self.0.lock().unwrap().default_per_page = per_page;
    self
  }

  pub fn with_attachment(self, volume_id: &str, node: NodeId) -> Self {
    self
      .0
      .lock()
      .unwrap()
      .attachments
      .insert((volume_id.to_owned(), node));
    self
  }

  /// Make the next call of `operation` fail with `err`.
  pub fn fail_next(&self, operation: Operation, err: ProviderError) {
    self
      .0
      .lock()
      .unwrap()
      .failures
      .entry(operation)
      .or_default()
      .push_back(err);
  }

  pub fn volumes(&self) -> Vec<ProviderVolume> {
    self.0.lock().unwrap().volumes.clone()
  }

  pub fn is_attached(&self, volume_id: &str, node: NodeId) -> bool {
    self
      .0
      .lock()
      .unwrap()
      .attachments
      .contains(&(volume_id.to_owned(), node))
  }

  pub fn get_log(&self) -> Vec<FakeAction> {
    self.0.lock().unwrap().log.clone()
  }

  pub fn create_calls(&self) -> usize {
    self
      .get_log()
      .iter()
      .filter(|a| matches!(a, FakeAction::CreateVolume(_)))
      .count()
  }
}

#[async_trait]
impl StorageProvider for FakeProvider {
  async fn list_volumes(
    &self,
    params: &ListVolumeParams,
  ) -> Result<Page<ProviderVolume>, ProviderError> {
    let mut inner = self.0.lock().unwrap();
    inner.call(
      FakeAction::ListVolumes(params.clone()),
      Operation::ListVolumes,
    )?;

    let matching: Vec<_> = inner
      .volumes
      .iter()
      .filter(|v| v.region == params.region)
      .filter(|v| params.name.as_ref().map_or(true, |name| &v.name == name))
      .cloned()
      .collect();

    let per_page = params.per_page.unwrap_or(inner.default_per_page).max(1) as usize;
    let page = params.page.unwrap_or(1).max(1);
    let total_pages = ((matching.len() + per_page - 1) / per_page).max(1) as u32;

    let items = matching
      .into_iter()
      .skip((page as usize - 1) * per_page)
      .take(per_page)
      .collect();

    // Single page collections carry no link metadata at all.
    let links = if total_pages == 1 {
      None
    } else {
      Some(PageLinks {
        current: page,
        last: if page >= total_pages {
          None
        } else {
          Some(total_pages)
        },
      })
    };

    Ok(Page { items, links })
  }

  async fn create_volume(
    &self,
    request: &VolumeCreateRequest,
  ) -> Result<ProviderVolume, ProviderError> {
    let mut inner = self.0.lock().unwrap();
    inner.call(
      FakeAction::CreateVolume(request.clone()),
      Operation::CreateVolume,
    )?;

    let volume = ProviderVolume {
      id: format!("vol-{}", inner.next_id),
      name: request.name.clone(),
      region: request.region.clone(),
      size_gib: request.size_gib,
      ownership: request.ownership.clone(),
    };
    inner.next_id += 1;
    inner.volumes.push(volume.clone());

    Ok(volume)
  }

  async fn delete_volume(&self, volume_id: &str) -> Result<(), ProviderError> {
    let mut inner = self.0.lock().unwrap();
    inner.call(
      FakeAction::DeleteVolume(volume_id.to_owned()),
      Operation::DeleteVolume,
    )?;

    let before = inner.volumes.len();
    inner.volumes.retain(|v| v.id != volume_id);
    if inner.volumes.len() == before {
      return Err(ProviderError::http(
        404,
        "The resource you were accessing could not be found.",
      ));
    }

    inner.attachments.retain(|(id, _)| id != volume_id);
    Ok(())
  }

  async fn attach(&self, volume_id: &str, node: NodeId) -> Result<(), ProviderError> {
    let mut inner = self.0.lock().unwrap();
    inner.call(
      FakeAction::Attach {
        volume_id: volume_id.to_owned(),
        node,
      },
      Operation::Attach,
    )?;

    if !inner.volumes.iter().any(|v| v.id == volume_id) {
      return Err(ProviderError::http(404, "volume not found"));
    }

    if !inner.attachments.insert((volume_id.to_owned(), node)) {
      return Err(ProviderError::http(
        422,
        "This volume is already attached to the requested droplet.",
      ));
    }

    Ok(())
  }

  async fn detach(&self, volume_id: &str, node: NodeId) -> Result<(), ProviderError> {
    let mut inner = self.0.lock().unwrap();
    inner.call(
      FakeAction::Detach {
        volume_id: volume_id.to_owned(),
        node,
      },
      Operation::Detach,
    )?;

    if !inner.attachments.remove(&(volume_id.to_owned(), node)) {
      return Err(ProviderError::http(404, "Attachment not found"));
    }

    Ok(())
  }
}
