//! Daily observation loading for the runner.
//!
//! Reads a CSV of daily rows, turns each one into a `DailyObservation`, and
//! hands the core a sequence grouped by instrument and sorted by date.
//!
//! Malformed rows (unparseable date, non-numeric or negative price, missing
//! instrument id) never reach the core. Under `RejectPolicy::Skip` they are
//! logged and counted; under `RejectPolicy::Strict` the first one aborts the load.
//!
//! Sorting is stable, so rows sharing an (instrument, date) keep their file
//! order. That fixes which same-day row supplies a month's open and close.

use chrono::{NaiveDate, NaiveDateTime};
use monthlab_core::{DailyObservation, ObservationError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read input '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("input has more than one '{column}' column: {found}")]
    DuplicateColumn { column: &'static str, found: String },

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

/// What to do with a row that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectPolicy {
    /// Log and drop the row, keep loading.
    #[default]
    Skip,
    /// Fail the whole load.
    Strict,
}

/// A dropped row and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRejection {
    pub line: u64,
    pub reason: String,
}

/// Counters from a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_rejected: usize,
    /// Accepted rows whose low/high do not bracket open/close.
    pub inconsistent_rows: usize,
    pub rejections: Vec<RowRejection>,
}

/// Result of loading a file, including its content hash.
#[derive(Debug)]
pub struct LoadedData {
    /// Observations grouped by instrument, date-ascending within each group.
    pub observations: Vec<DailyObservation>,
    pub report: LoadReport,
    /// BLAKE3 hex digest of the raw input bytes.
    pub input_hash: String,
}

/// Accepted date layouts. Any time part is dropped.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Raw CSV row before validation. Unknown columns (e.g. volume) are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "symbol", alias = "instrument_id")]
    ticker: String,
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
}

/// Load and sort daily observations from a CSV file.
pub fn load_observations(path: &Path, policy: RejectPolicy) -> Result<LoadedData, LoadError> {
    info!(input = %path.display(), ?policy, "loading daily observations");
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let input_hash = blake3::hash(&bytes).to_hex().to_string();

    let (observations, report) = load_from_reader(bytes.as_slice(), policy)?;
    info!(
        rows_read = report.rows_read,
        rows_rejected = report.rows_rejected,
        inconsistent_rows = report.inconsistent_rows,
        "input loaded"
    );

    Ok(LoadedData {
        observations,
        report,
        input_hash,
    })
}

/// Parse, validate and sort observations from any CSV reader.
pub fn load_from_reader<R: Read>(
    reader: R,
    policy: RejectPolicy,
) -> Result<(Vec<DailyObservation>, LoadReport), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_columns(&headers)?;

    let mut observations = Vec::new();
    let mut report = LoadReport::default();

    for result in rdr.records() {
        report.rows_read += 1;
        let parsed = result
            .map_err(|e| RowRejection {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })
            .and_then(|record| {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                parse_record(&record, &headers).map_err(|reason| RowRejection { line, reason })
            });

        match parsed {
            Ok(obs) => {
                if !obs.is_consistent() {
                    report.inconsistent_rows += 1;
                    debug!(instrument = %obs.instrument_id, date = %obs.date, "low/high do not bracket open/close");
                }
                observations.push(obs);
            }
            Err(rejection) => match policy {
                RejectPolicy::Strict => {
                    return Err(LoadError::MalformedRow {
                        line: rejection.line,
                        reason: rejection.reason,
                    });
                }
                RejectPolicy::Skip => {
                    warn!(line = rejection.line, reason = %rejection.reason, "rejected malformed row");
                    report.rows_rejected += 1;
                    report.rejections.push(rejection);
                }
            },
        }
    }

    sort_observations(&mut observations);
    Ok((observations, report))
}

/// Stable sort by (instrument, date).
pub fn sort_observations(observations: &mut [DailyObservation]) {
    observations.sort_by(|a, b| {
        a.instrument_id
            .cmp(&b.instrument_id)
            .then_with(|| a.date.cmp(&b.date))
    });
}

/// Parse a date cell in any accepted layout.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn check_columns(headers: &csv::StringRecord) -> Result<(), LoadError> {
    let required: [(&'static str, &[&str]); 6] = [
        ("ticker", &["ticker", "symbol", "instrument_id"]),
        ("date", &["date"]),
        ("open", &["open"]),
        ("high", &["high"]),
        ("low", &["low"]),
        ("close", &["close"]),
    ];
    for (column, names) in required {
        let found: Vec<&str> = headers.iter().filter(|h| names.contains(h)).collect();
        match found.len() {
            0 => return Err(LoadError::MissingColumn(column)),
            1 => {}
            _ => {
                return Err(LoadError::DuplicateColumn {
                    column,
                    found: found.join(", "),
                })
            }
        }
    }
    Ok(())
}

fn parse_record(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
) -> Result<DailyObservation, String> {
    let raw: RawRow = record.deserialize(Some(headers)).map_err(|e| e.to_string())?;

    let date = parse_date(&raw.date).ok_or_else(|| format!("unparseable date '{}'", raw.date))?;
    let open = parse_price("open", &raw.open)?;
    let high = parse_price("high", &raw.high)?;
    let low = parse_price("low", &raw.low)?;
    let close = parse_price("close", &raw.close)?;

    DailyObservation::new(raw.ticker, date, open, high, low, close)
        .map_err(|e: ObservationError| e.to_string())
}

fn parse_price(field: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{field} is not numeric: '{raw}'"))
}
