//! Seeded Exponential Moving Average (EMA).
//!
//! Two phases over a close series of length L with window W:
//! 1. Build a seeded input: positions 0..W-2 empty, position W-1 holds the SMA
//!    of the first W closes, positions W.. hold the raw closes.
//! 2. Scan it with the recurrence EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1],
//!    alpha = 2 / (W + 1), starting from the seed.
//!
//! L < W gives an all-missing result. Lookback: W - 1.

use super::{window_mean, Indicator};

/// Scan state of the seeded EMA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmaState {
    /// No seed seen yet; output is missing.
    AwaitingSeed,
    /// Recurrence running from the last emitted value.
    Seeded { value: f64 },
}

impl EmaState {
    /// Advance one position of the seeded input.
    ///
    /// The first present input is taken verbatim as the seed. Every later
    /// present input is smoothed into the running value. An absent input after
    /// seeding repeats the running value.
    pub fn step(self, input: Option<f64>, alpha: f64) -> (EmaState, Option<f64>) {
        match (self, input) {
            (EmaState::AwaitingSeed, None) => (EmaState::AwaitingSeed, None),
            (EmaState::AwaitingSeed, Some(seed)) => (EmaState::Seeded { value: seed }, Some(seed)),
            (EmaState::Seeded { value }, Some(x)) => {
                let next = alpha * x + (1.0 - alpha) * value;
                (EmaState::Seeded { value: next }, Some(next))
            }
            (EmaState::Seeded { value }, None) => (EmaState::Seeded { value }, Some(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeededEma {
    period: usize,
    name: String,
}

impl SeededEma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Smoothing factor 2 / (W + 1).
    pub fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Build the seeded input sequence (phase 1).
    ///
    /// Returns `None` when the series is shorter than the window.
    pub fn seeded_input(&self, closes: &[f64]) -> Option<Vec<Option<f64>>> {
        if closes.len() < self.period {
            return None;
        }
        let anchor = window_mean(&closes[..self.period]);
        let seeded = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| match i.cmp(&(self.period - 1)) {
                std::cmp::Ordering::Less => None,
                std::cmp::Ordering::Equal => Some(anchor),
                std::cmp::Ordering::Greater => Some(close),
            })
            .collect();
        Some(seeded)
    }
}

impl Indicator for SeededEma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period() - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let Some(seeded) = self.seeded_input(closes) else {
            return vec![None; closes.len()];
        };

        let alpha = self.alpha();
        let mut state = EmaState::AwaitingSeed;
        seeded
            .into_iter()
            .map(|input| {
                let (next, out) = state.step(input, alpha);
                state = next;
                out
            })
            .collect()
    }
}
