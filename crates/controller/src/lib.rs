macro_rules! unsupported {
  ($name:expr) => {{
    ::tracing::error!("Unsupported method {} called", $name);
    return Err(
      ::tonic::Status::new(
        ::tonic::Code::Unimplemented,
        format!("Unsupported method {} called", $name),
      )
      .into(),
    );
  }};
}

pub mod config;
pub mod controller;
pub mod provider;
pub mod units;
pub mod volume;

mod utils;

#[cfg(test)]
mod fake;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{ControllerCapabilities, ControllerService, VolumeController};
pub use provider::{ProviderError, StorageProvider};
