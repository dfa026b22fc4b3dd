use std::fmt;
use thiserror::Error;

/// A failed call into the storage provider's API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  /// The provider answered with a non-success HTTP status.
  #[error("{status}: {message}")]
  Http { status: u16, message: String },

  /// The request never produced a response (connection reset, timeout, ...).
  #[error("transport error: {0}")]
  Transport(String),
}

/// The provider call an error came from. Whether a status or message means
/// "nothing to do" depends on what was being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  ListVolumes,
  CreateVolume,
  DeleteVolume,
  Attach,
  Detach,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Operation::ListVolumes => "list volumes",
      Operation::CreateVolume => "create volume",
      Operation::DeleteVolume => "delete volume",
      Operation::Attach => "attach volume",
      Operation::Detach => "detach volume",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
  /// The desired end state already holds (already attached, already detached).
  AlreadyInDesiredState,
  /// The addressed resource does not exist.
  NotFound,
  /// Worth retrying the whole operation later.
  Transient,
  /// Retrying the same request will fail the same way.
  Permanent,
  Unknown,
}

const HTTP_NOT_FOUND: u16 = 404;
const HTTP_REQUEST_TIMEOUT: u16 = 408;
const HTTP_UNPROCESSABLE_ENTITY: u16 = 422;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

const ALREADY_ATTACHED: &str = "already attached";
const ATTACHMENT_NOT_FOUND: &str = "attachment not found";
const NOT_FOUND: &str = "not found";

impl ProviderError {
  pub fn http(status: u16, message: impl Into<String>) -> Self {
    ProviderError::Http {
      status,
      message: message.into(),
    }
  }

  pub fn transport(message: impl fmt::Display) -> Self {
    ProviderError::Transport(message.to_string())
  }

  #[inline]
  pub fn status(&self) -> Option<u16> {
    match self {
      ProviderError::Http { status, .. } => Some(*status),
      ProviderError::Transport(_) => None,
    }
  }

  #[inline]
  pub fn message(&self) -> &str {
    match self {
      ProviderError::Http { message, .. } => message,
      ProviderError::Transport(message) => message,
    }
  }

  /// Map this error onto a protocol-neutral outcome for the given operation.
  ///
  /// The provider does not use status codes consistently, so the
  /// "already in desired state" signals for attach and detach are accepted
  /// from either the 422 status or the error message.
  pub fn classify(&self, operation: Operation) -> ErrorClass {
    let status = match self {
      ProviderError::Transport(_) => return ErrorClass::Transient,
      ProviderError::Http { status, .. } => *status,
    };
    let message = self.message().to_ascii_lowercase();

    match operation {
      Operation::Attach
        if status == HTTP_UNPROCESSABLE_ENTITY || message.contains(ALREADY_ATTACHED) =>
      {
        return ErrorClass::AlreadyInDesiredState
      }
      Operation::Detach
        if status == HTTP_UNPROCESSABLE_ENTITY || message.contains(ATTACHMENT_NOT_FOUND) =>
      {
        return ErrorClass::AlreadyInDesiredState
      }
      _ => (),
    }

    match status {
      HTTP_NOT_FOUND => ErrorClass::NotFound,
      HTTP_REQUEST_TIMEOUT | HTTP_TOO_MANY_REQUESTS => ErrorClass::Transient,
      s if s >= 500 && s < 600 => ErrorClass::Transient,
      _ if message.contains(NOT_FOUND) => ErrorClass::NotFound,
      s if s >= 400 && s < 500 => ErrorClass::Permanent,
      _ => ErrorClass::Unknown,
    }
  }
}

/// Status handed back to the orchestrator when a provider error is surfaced.
pub(crate) fn to_status(operation: Operation, error: &ProviderError) -> tonic::Status {
  use tonic::{Code, Status};

  let code = match error.classify(operation) {
    ErrorClass::NotFound => Code::NotFound,
    ErrorClass::Transient => Code::Unavailable,
    ErrorClass::Permanent => Code::FailedPrecondition,
    ErrorClass::AlreadyInDesiredState | ErrorClass::Unknown => Code::Unknown,
  };

  Status::new(code, format!("{} failed: {}", operation, error))
}
