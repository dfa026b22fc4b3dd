//! Binary size units. The provider sizes volumes in whole gibibytes, while
//! the orchestrator always speaks bytes.

pub const KB: u64 = 1 << 10;
pub const MB: u64 = 1 << 20;
pub const GB: u64 = 1 << 30;
pub const TB: u64 = 1 << 40;

/// Size used when a create request carries no capacity range.
pub const DEFAULT_VOLUME_SIZE: u64 = 16 * GB;

pub const MIN_VOLUME_SIZE: u64 = GB;
pub const MAX_VOLUME_SIZE: u64 = 16 * TB;

/// Convert a provider size (GiB) into bytes.
#[inline]
pub const fn gib_to_bytes(gib: u64) -> u64 {
  gib.saturating_mul(GB)
}

/// Truncating conversion from bytes into whole GiB.
#[inline]
pub const fn bytes_to_gib(bytes: u64) -> u64 {
  bytes / GB
}

/// Smallest whole number of GiB that holds `bytes`.
#[inline]
pub const fn bytes_to_gib_ceil(bytes: u64) -> u64 {
  bytes / GB + (bytes % GB != 0) as u64
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  #[test]
  fn units_scale_by_1024() {
    assert_eq!(KB, 1024);
    assert_eq!(MB, 1024 * KB);
    assert_eq!(GB, 1024 * MB);
    assert_eq!(TB, 1024 * GB);
  }

  #[test]
  fn default_size_is_16_gib() {
    assert_eq!(DEFAULT_VOLUME_SIZE, 16 * (1 << 30));
    assert!(MIN_VOLUME_SIZE <= DEFAULT_VOLUME_SIZE);
    assert!(DEFAULT_VOLUME_SIZE <= MAX_VOLUME_SIZE);
  }

  #[test_case(0 => 0 ; "zero")]
  #[test_case(GB - 1 => 0 ; "just under one")]
  #[test_case(GB => 1 ; "exactly one")]
  #[test_case(16 * GB + 1 => 16 ; "truncates")]
  fn truncating(bytes: u64) -> u64 {
    bytes_to_gib(bytes)
  }

  #[test_case(1 => 1 ; "one byte")]
  #[test_case(GB => 1 ; "exactly one")]
  #[test_case(GB + 1 => 2 ; "rounds up")]
  fn rounding_up(bytes: u64) -> u64 {
    bytes_to_gib_ceil(bytes)
  }
}
