use crate::{
  config::ControllerConfig,
  provider::{to_status, ListVolumeParams, Operation, ProviderError, StorageProvider},
  volume::Volume,
};
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ListVolumesRequest {
  max_entries: Option<NonZeroU32>,
  starting_token: Option<String>,
}

impl ListVolumesRequest {
  /// `0` and `""` mean "not set", as on the wire.
  pub fn new(max_entries: u32, starting_token: impl Into<String>) -> Self {
    let starting_token = match starting_token.into() {
      v if v.is_empty() => None,
      v => Some(v),
    };

    ListVolumesRequest {
      max_entries: NonZeroU32::new(max_entries),
      starting_token,
    }
  }

  /// If specified (non-zero value), used as the page size requested from
  /// the provider. This field is OPTIONAL.
  #[inline]
  pub fn max_entries(&self) -> Option<NonZeroU32> {
    self.max_entries
  }

  /// A token to specify where to start paginating. Set this field to
  /// `next_token` returned by a previous `ListVolumes` call. This field
  /// is OPTIONAL.
  #[inline]
  pub fn starting_token(&self) -> Option<&str> {
    self.starting_token.as_deref()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeListEntry {
  volume: Volume,
}

impl VolumeListEntry {
  #[inline]
  pub fn volume(&self) -> &Volume {
    &self.volume
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListVolumesResponse {
  /// The volume entires.
  entries: Vec<VolumeListEntry>,
  /// Page number of the last page read. Passing it back as
  /// `starting_token` resumes listing from that page.
  next_token: Option<String>,
}

impl ListVolumesResponse {
  #[inline]
  pub fn entries(&self) -> &[VolumeListEntry] {
    &self.entries
  }

  #[inline]
  pub fn next_token(&self) -> Option<&str> {
    self.next_token.as_deref()
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListVolumesError {
  /// Indicates that `starting_token` is not valid.
  #[error("Invalid `starting_token`: {0}")]
  InvalidStartingToken(String),

  #[error("Provider error: {0}")]
  Provider(#[from] ProviderError),
}

use tonic::{Code, Status};
impl From<ListVolumesError> for tonic::Status {
  fn from(value: ListVolumesError) -> Self {
    match value {
      ListVolumesError::Provider(v) => to_status(Operation::ListVolumes, &v),
      value => {
        let code = match &value {
          ListVolumesError::InvalidStartingToken(_) => Code::Aborted,
          ListVolumesError::Provider(_) => unreachable!(),
        };

        Status::new(code, value.to_string())
      }
    }
  }
}

fn parse_starting_page(token: Option<&str>) -> Result<u32, ListVolumesError> {
  match token {
    None => Ok(1),
    Some(token) => token
      .parse::<NonZeroU32>()
      .map(NonZeroU32::get)
      .map_err(|_| ListVolumesError::InvalidStartingToken(token.to_owned())),
  }
}

/// Reads every page from the starting page on.
///
/// There is no consistent snapshot across pages: volumes created or
/// deleted while the loop runs may be skipped or reported twice.
pub(super) async fn list<P: StorageProvider>(
  provider: &P,
  config: &ControllerConfig,
  request: ListVolumesRequest,
) -> Result<ListVolumesResponse, ListVolumesError> {
  let mut page = parse_starting_page(request.starting_token())?;
  let mut params = ListVolumeParams {
    region: config.region.clone(),
    name: None,
    page: Some(page),
    per_page: config.page_size(request.max_entries()),
  };

  let mut entries = Vec::new();
  let last_page = loop {
    let response = provider.list_volumes(&params).await?;
    entries.extend(response.items.iter().map(|v| VolumeListEntry {
      volume: Volume::from(v),
    }));

    match response.links {
      None => break page,
      Some(links) if links.is_last_page() => break links.current,
      Some(links) => {
        page = page.max(links.current) + 1;
        params.page = Some(page);
      }
    }
  };

  debug!(entries = entries.len(), last_page, "listed volumes");
  Ok(ListVolumesResponse {
    entries,
    next_token: Some(last_page.to_string()),
  })
}
