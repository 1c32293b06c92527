//! Numeric conversion helpers centralizing lossy casts used by averaging.

use num_traits::cast::cast;

/// Convert a reward count to f64, allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert a playthrough count to f64.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Average a summed quantity over `count` samples, returning 0.0 for no samples.
#[must_use]
pub fn mean(sum: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    u64_to_f64(sum) / usize_to_f64(count)
}

/// Express `part / whole` as a percentage, returning 0.0 for a non-positive whole.
#[must_use]
pub fn percentage(part: f64, whole: f64) -> f64 {
    if !whole.is_finite() || whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}
