//! DailyObservation: one row of raw daily price input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a row cannot become a `DailyObservation`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("instrument id is empty")]
    EmptyInstrument,

    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} is negative: {value}")]
    Negative { field: &'static str, value: f64 },
}

/// OHLC prices for a single instrument on a single day.
///
/// Built by the loader and consumed once by the monthly aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyObservation {
    /// Build an observation, rejecting an empty id and non-finite or negative prices.
    pub fn new(
        instrument_id: impl Into<String>,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Result<Self, ObservationError> {
        let instrument_id = instrument_id.into();
        if instrument_id.trim().is_empty() {
            return Err(ObservationError::EmptyInstrument);
        }
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() {
                return Err(ObservationError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ObservationError::Negative { field, value });
            }
        }
        Ok(Self {
            instrument_id,
            date,
            open,
            high,
            low,
            close,
        })
    }

    /// True when `low <= open, close <= high`.
    ///
    /// Inconsistent rows are still aggregated; the loader only counts them.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn valid_observation_builds() {
        let obs = DailyObservation::new("SPY", jan(2), 100.0, 105.0, 98.0, 103.0).unwrap();
        assert_eq!(obs.instrument_id, "SPY");
        assert!(obs.is_consistent());
    }

    #[test]
    fn zero_prices_are_allowed() {
        assert!(DailyObservation::new("X", jan(2), 0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_empty_instrument() {
        let err = DailyObservation::new("  ", jan(2), 1.0, 1.0, 1.0, 1.0).unwrap_err();
        assert_eq!(err, ObservationError::EmptyInstrument);
    }

    #[test]
    fn rejects_nan_price() {
        let err = DailyObservation::new("X", jan(2), 1.0, f64::NAN, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, ObservationError::NonFinite { field: "high", .. }));
    }

    #[test]
    fn rejects_negative_price() {
        let err = DailyObservation::new("X", jan(2), 1.0, 2.0, -0.5, 1.0).unwrap_err();
        assert!(matches!(err, ObservationError::Negative { field: "low", .. }));
    }

    #[test]
    fn detects_inconsistent_high_low() {
        let obs = DailyObservation::new("X", jan(2), 100.0, 97.0, 98.0, 99.0).unwrap();
        assert!(!obs.is_consistent());
    }
}
