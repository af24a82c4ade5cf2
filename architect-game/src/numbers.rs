//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round to two decimal places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_2dp(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Clamp a percentage-style value to `[0, 100]`, mapping NaN to 0.
#[must_use]
pub fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Percent change from `baseline` to `current`.
///
/// Non-positive or non-finite baselines yield 0.0 instead of dividing.
#[must_use]
pub fn percent_change(baseline: f64, current: f64) -> f64 {
    if !baseline.is_finite() || baseline <= 0.0 {
        return 0.0;
    }
    (current - baseline) / baseline * 100.0
}

/// Convert a usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}
