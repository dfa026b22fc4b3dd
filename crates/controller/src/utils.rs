use std::fmt;
use tracing::{field, Span};

/// Records a value into a field of the current span and passes it through,
/// so handlers can log what they return without binding temporaries.
pub(crate) trait Record: Sized {
  fn record_field(self, field: &'static str) -> Self;

  #[inline]
  fn record_request(self) -> Self {
    self.record_field("request")
  }

  #[inline]
  fn record_response(self) -> Self {
    self.record_field("response")
  }
}

impl<T: fmt::Debug> Record for T {
  #[inline]
  fn record_field(self, field: &'static str) -> Self {
    Span::current().record(field, &field::debug(&self));
    self
  }
}

#[inline]
pub(crate) fn record_request<T: fmt::Debug>(request: T) -> T {
  request.record_request()
}

/// Records the `Ok` value of a handler result as the span's response.
#[inline]
pub(crate) fn record_result<T: fmt::Debug, E>(result: Result<T, E>) -> Result<T, E> {
  result.map(Record::record_response)
}
