//! Monthly aggregation of daily observations.
//!
//! Daily rows for one instrument are split into contiguous runs that share a
//! calendar (year, month). Each run reduces to one `MonthlyRecord`:
//! first open, max high, min low, last close. Bucketing depends only on the
//! calendar month, never on day counts.

use chrono::Datelike;
use std::collections::BTreeMap;

use crate::domain::{month_end, DailyObservation, IndicatorSeries, MonthlyRecord};

/// Aggregate one instrument's date-sorted observations into monthly records.
///
/// The input must already be ordered by date. Same-day rows are reduced in the
/// order given: the first one supplies the open, the last one the close.
/// An empty slice yields an empty vector.
pub fn aggregate_monthly(observations: &[DailyObservation]) -> Vec<MonthlyRecord> {
    let mut aggregated = Vec::new();
    let mut current: Option<MonthlyRecord> = None;

    for obs in observations {
        let key = (obs.date.year(), obs.date.month());

        if let Some(ref mut bucket) = current {
            if bucket.month_key() == key {
                bucket.high = bucket.high.max(obs.high);
                bucket.low = bucket.low.min(obs.low);
                bucket.close = obs.close;
                continue;
            }
        }

        if let Some(done) = current.take() {
            aggregated.push(done);
        }
        current = Some(open_bucket(obs));
    }

    if let Some(done) = current {
        aggregated.push(done);
    }

    debug_assert!(
        aggregated
            .windows(2)
            .all(|w| w[0].month_end_date < w[1].month_end_date),
        "observations were not date-sorted"
    );

    aggregated
}

/// Split a mixed, instrument-grouped stream into per-instrument sequences.
///
/// Relative order within each instrument is preserved.
pub fn partition_by_instrument(
    observations: &[DailyObservation],
) -> BTreeMap<String, Vec<DailyObservation>> {
    let mut partitioned: BTreeMap<String, Vec<DailyObservation>> = BTreeMap::new();
    for obs in observations {
        partitioned
            .entry(obs.instrument_id.clone())
            .or_default()
            .push(obs.clone());
    }
    partitioned
}

/// Aggregate every instrument independently.
///
/// Returns instrument id → monthly records ordered by `month_end_date`.
pub fn aggregate_by_instrument(
    observations: &[DailyObservation],
) -> BTreeMap<String, Vec<MonthlyRecord>> {
    partition_by_instrument(observations)
        .into_iter()
        .map(|(instrument, daily)| (instrument, aggregate_monthly(&daily)))
        .collect()
}

fn open_bucket(obs: &DailyObservation) -> MonthlyRecord {
    MonthlyRecord {
        instrument_id: obs.instrument_id.clone(),
        month_end_date: month_end(obs.date),
        open: obs.open,
        high: obs.high,
        low: obs.low,
        close: obs.close,
        indicators: IndicatorSeries::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[allow(clippy::too_many_arguments)]
    fn obs(
        symbol: &str,
        y: i32,
        m: u32,
        d: u32,
        o: f64,
        h: f64,
        l: f64,
        c: f64,
    ) -> DailyObservation {
        DailyObservation {
            instrument_id: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: o,
            high: h,
            low: l,
            close: c,
        }
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(aggregate_monthly(&[]).is_empty());
        assert!(aggregate_by_instrument(&[]).is_empty());
    }

    #[test]
    fn single_month_reduces_ohlc() {
        let daily = vec![
            obs("SPY", 2024, 1, 2, 100.0, 105.0, 99.0, 104.0),
            obs("SPY", 2024, 1, 3, 104.0, 110.0, 103.0, 108.0),
            obs("SPY", 2024, 1, 4, 108.0, 109.0, 95.0, 96.0),
        ];
        let monthly = aggregate_monthly(&daily);
        assert_eq!(monthly.len(), 1);
        let m = &monthly[0];
        assert_eq!(m.open, 100.0);
        assert_eq!(m.high, 110.0);
        assert_eq!(m.low, 95.0);
        assert_eq!(m.close, 96.0);
        assert_eq!(m.month_end_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(m.indicators.is_empty());
    }

    #[test]
    fn single_trading_day_reports_true_month_end() {
        let monthly = aggregate_monthly(&[obs("SPY", 2024, 2, 1, 1.0, 2.0, 0.5, 1.5)]);
        assert_eq!(
            monthly[0].month_end_date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn month_boundaries_split_buckets() {
        let daily = vec![
            obs("SPY", 2023, 12, 29, 10.0, 11.0, 9.0, 10.5),
            obs("SPY", 2024, 1, 2, 10.5, 12.0, 10.0, 11.5),
            obs("SPY", 2024, 1, 31, 11.5, 13.0, 11.0, 12.5),
            obs("SPY", 2024, 2, 1, 12.5, 12.6, 12.0, 12.1),
        ];
        let monthly = aggregate_monthly(&daily);
        let ends: Vec<String> = monthly
            .iter()
            .map(|m| m.month_end_date.to_string())
            .collect();
        assert_eq!(ends, vec!["2023-12-31", "2024-01-31", "2024-02-29"]);
        assert_eq!(monthly[1].open, 10.5);
        assert_eq!(monthly[1].close, 12.5);
    }

    #[test]
    fn same_month_different_year_is_a_new_bucket() {
        let daily = vec![
            obs("SPY", 2023, 3, 15, 1.0, 1.0, 1.0, 1.0),
            obs("SPY", 2024, 3, 15, 2.0, 2.0, 2.0, 2.0),
        ];
        assert_eq!(aggregate_monthly(&daily).len(), 2);
    }

    #[test]
    fn same_day_rows_use_delivery_order() {
        let daily = vec![
            obs("SPY", 2024, 5, 6, 50.0, 55.0, 49.0, 51.0),
            obs("SPY", 2024, 5, 6, 60.0, 61.0, 48.0, 59.0),
        ];
        let monthly = aggregate_monthly(&daily);
        assert_eq!(monthly[0].open, 50.0);
        assert_eq!(monthly[0].close, 59.0);
        assert_eq!(monthly[0].high, 61.0);
        assert_eq!(monthly[0].low, 48.0);
    }

    #[test]
    fn instruments_are_partitioned_and_ordered() {
        let daily = vec![
            obs("QQQ", 2024, 1, 2, 1.0, 1.0, 1.0, 1.0),
            obs("QQQ", 2024, 2, 2, 2.0, 2.0, 2.0, 2.0),
            obs("AAPL", 2024, 1, 2, 3.0, 3.0, 3.0, 3.0),
        ];
        let by_instrument = aggregate_by_instrument(&daily);
        let keys: Vec<&str> = by_instrument.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["AAPL", "QQQ"]);
        assert_eq!(by_instrument["QQQ"].len(), 2);
        assert_eq!(by_instrument["AAPL"][0].instrument_id, "AAPL");
    }
}
