//! Rolling-window indicators over a single price column.
//!
//! Indicators are pure functions: a column of values in (NaN = missing),
//! a column of the same length out. A window is the trailing `period` rows
//! of the matrix including the current one, and is defined only when every
//! row in it holds a value. Output at row t never depends on rows after t.

pub mod extreme;
pub mod sma;

pub use extreme::{Extreme, RollingExtreme};
pub use sma::Sma;

/// Trait for rolling indicators over one column.
pub trait RollingIndicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rolling_max_252").
    fn name(&self) -> &str;

    /// Number of rows needed before the indicator produces a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole column.
    ///
    /// Returns a `Vec<f64>` of the same length as `values`; the first
    /// `lookback()` entries are always NaN.
    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
