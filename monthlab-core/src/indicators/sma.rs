//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `period` closes.
//! Lookback: period - 1 (first defined value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Mean of a non-empty window.
///
/// Each window is summed from scratch so the seeded EMA anchor and the SMA
/// at the same position are bit-identical.
pub fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        for (i, slot) in result.iter_mut().enumerate().skip(self.period - 1) {
            *slot = Some(window_mean(&closes[i + 1 - self.period..=i]));
        }

        result
    }
}
