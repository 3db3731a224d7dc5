//! Moving-average indicators over a monthly close series.
//!
//! Indicators are pure functions: a close series in, a series of the same
//! length out. Positions without enough history are `None`, never zero.
//!
//! No indicator value at position t may depend on closes after t.

pub mod ema;
pub mod sma;

pub use ema::{EmaState, SeededEma};
pub use sma::{window_mean, Sma};

/// Trait for indicators over a close series.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_10", "ema_20").
    fn name(&self) -> &str;

    /// Number of leading positions that are always `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a vector of the same length as `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
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
