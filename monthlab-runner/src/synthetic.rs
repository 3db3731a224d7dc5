//! Synthetic daily datasets for demos and benchmarks.
//!
//! Produces a weekday-only random walk from a starting price of 100.0. The RNG
//! is seeded from the BLAKE3 hash of the instrument id, so the same id and
//! date range always give the same rows.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use monthlab_core::DailyObservation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

/// Generate one instrument's weekday observations over `[start, end]`.
pub fn generate_synthetic_observations(
    instrument_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyObservation> {
    let seed: [u8; 32] = *blake3::hash(instrument_id.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut observations = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

            observations.push(DailyObservation {
                instrument_id: instrument_id.to_string(),
                date: current,
                open,
                high,
                low,
                close,
            });
            price = close;
        }

        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    observations
}

/// Generate several instruments, grouped by instrument in the given order.
pub fn generate_dataset(
    instruments: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyObservation> {
    instruments
        .iter()
        .flat_map(|id| generate_synthetic_observations(id, start, end))
        .collect()
}

/// Write observations as a loader-compatible daily CSV.
pub fn write_dataset_csv<W: Write>(
    observations: &[DailyObservation],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["ticker", "date", "open", "high", "low", "close"])?;
    for o in observations {
        wtr.write_record([
            o.instrument_id.clone(),
            o.date.format("%Y-%m-%d").to_string(),
            format!("{:.4}", o.open),
            format!("{:.4}", o.high),
            format!("{:.4}", o.low),
            format!("{:.4}", o.close),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
