//! Aggregation + indicators for every instrument.
//!
//! Each instrument is processed from its own observations only. The result
//! is a two-level map: instrument id → monthly records by ascending month.

use std::collections::BTreeMap;

use crate::aggregate::{aggregate_monthly, partition_by_instrument};
use crate::domain::{DailyObservation, MonthlyRecord};
use crate::indicators::{Indicator, SeededEma, Sma};
use crate::window::{output_window, OUTPUT_WINDOW_LEN};

/// SMA window sizes attached to each monthly record.
pub const SMA_WINDOWS: [usize; 2] = [10, 20];

/// EMA window sizes attached to each monthly record.
pub const EMA_WINDOWS: [usize; 2] = [10, 20];

/// Monthly series per instrument.
pub type InstrumentSeries = BTreeMap<String, Vec<MonthlyRecord>>;

/// Fill the indicator columns of one instrument's monthly records in place.
pub fn apply_indicators(records: &mut [MonthlyRecord]) {
    let closes: Vec<f64> = records.iter().map(|r| r.close).collect();

    let sma_10 = Sma::new(SMA_WINDOWS[0]).compute(&closes);
    let sma_20 = Sma::new(SMA_WINDOWS[1]).compute(&closes);
    let ema_10 = SeededEma::new(EMA_WINDOWS[0]).compute(&closes);
    let ema_20 = SeededEma::new(EMA_WINDOWS[1]).compute(&closes);

    for (i, record) in records.iter_mut().enumerate() {
        record.indicators.sma_10 = sma_10[i];
        record.indicators.sma_20 = sma_20[i];
        record.indicators.ema_10 = ema_10[i];
        record.indicators.ema_20 = ema_20[i];
    }
}

/// Monthly records with indicators for a single instrument's sorted observations.
pub fn build_instrument(observations: &[DailyObservation]) -> Vec<MonthlyRecord> {
    let mut monthly = aggregate_monthly(observations);
    apply_indicators(&mut monthly);
    monthly
}

/// Full indicator-augmented monthly history for every instrument.
///
/// Observations must be grouped by instrument and date-sorted within each group.
pub fn build_series(observations: &[DailyObservation]) -> InstrumentSeries {
    partition_by_instrument(observations)
        .into_iter()
        .map(|(instrument, daily)| (instrument, build_instrument(&daily)))
        .collect()
}

/// Like `build_series`, truncated to each instrument's output window.
pub fn build_windows(observations: &[DailyObservation]) -> InstrumentSeries {
    build_series(observations)
        .into_iter()
        .map(|(instrument, records)| {
            let window = output_window(&records, OUTPUT_WINDOW_LEN).to_vec();
            (instrument, window)
        })
        .collect()
}
