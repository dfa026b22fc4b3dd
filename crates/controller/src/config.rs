use clap::Args;
use std::num::NonZeroU32;
use thiserror::Error;

/// Settings the controller needs from the process that hosts it. Meant to be
/// flattened into the host binary's command line.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ControllerConfig {
  /// Provider region in which volumes are created and listed.
  #[arg(long, env = "CSI_REGION")]
  pub region: String,

  /// Upper bound on the provider page size used while listing volumes.
  #[arg(long, env = "CSI_MAX_PAGE_SIZE")]
  pub max_page_size: Option<NonZeroU32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("region must not be empty")]
  EmptyRegion,
}

impl ControllerConfig {
  pub fn new(region: impl Into<String>) -> Self {
    ControllerConfig {
      region: region.into(),
      max_page_size: None,
    }
  }

  pub fn with_max_page_size(mut self, max_page_size: NonZeroU32) -> Self {
    self.max_page_size = Some(max_page_size);
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.region.trim().is_empty() {
      return Err(ConfigError::EmptyRegion);
    }

    Ok(())
  }

  /// Page size to request from the provider given the CO's `max_entries`.
  pub(crate) fn page_size(&self, max_entries: Option<NonZeroU32>) -> Option<u32> {
    match (max_entries, self.max_page_size) {
      (Some(requested), Some(cap)) => Some(requested.min(cap).get()),
      (requested, cap) => requested.or(cap).map(NonZeroU32::get),
    }
  }
}
