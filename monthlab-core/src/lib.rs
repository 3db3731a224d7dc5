//! Monthlab Core: monthly OHLC resampling and moving-average indicators.
//!
//! This crate contains the pure computation:
//! - Domain types (daily observations, monthly records, indicator columns)
//! - Calendar-month aggregation per instrument
//! - SMA and seeded EMA indicators
//! - Per-instrument pipeline and output windows
//!
//! It performs no I/O. Loading and emitting live in `monthlab-runner`.

pub mod aggregate;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod window;

pub use aggregate::{aggregate_by_instrument, aggregate_monthly, partition_by_instrument};
pub use domain::{month_end, DailyObservation, IndicatorSeries, MonthlyRecord, ObservationError};
pub use pipeline::{
    apply_indicators, build_instrument, build_series, build_windows, InstrumentSeries,
    EMA_WINDOWS, SMA_WINDOWS,
};
pub use window::{output_window, OUTPUT_WINDOW_LEN};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<DailyObservation>();
        require_sync::<DailyObservation>();
        require_send::<MonthlyRecord>();
        require_sync::<MonthlyRecord>();
        require_send::<IndicatorSeries>();
        require_sync::<IndicatorSeries>();
        require_send::<indicators::Sma>();
        require_sync::<indicators::Sma>();
        require_send::<indicators::SeededEma>();
        require_sync::<indicators::SeededEma>();
    }

    #[test]
    fn indicator_trait_is_object_safe() {
        let boxed: Vec<Box<dyn indicators::Indicator>> = vec![
            Box::new(indicators::Sma::new(10)),
            Box::new(indicators::SeededEma::new(20)),
        ];
        let names: Vec<&str> = boxed.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["sma_10", "ema_20"]);
    }
}
