//! Window emission: per-instrument CSV artifacts.
//!
//! The core selects each instrument's output window; this module serializes
//! it. `WindowSink` is the seam: `CsvDirSink` writes one file per instrument,
//! `MemorySink` keeps the rendered text for tests and embedding.
//!
//! Columns: ticker, date, open, high, low, close, sma_10, sma_20, ema_10, ema_20.
//! Missing indicators are empty fields, so they never read back as zero.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use monthlab_core::MonthlyRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default file name prefix: `result_<ticker>.csv`.
pub const DEFAULT_FILE_PREFIX: &str = "result_";

/// Header row of every emitted file.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "ticker", "date", "open", "high", "low", "close", "sma_10", "sma_20", "ema_10", "ema_20",
];

/// Errors from emitting a window.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("'{instrument_id}' maps to '{path}', already written for '{existing}'")]
    PathCollision {
        instrument_id: String,
        existing: String,
        path: PathBuf,
    },
}

/// What a sink produced for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitReceipt {
    /// File written, if the sink writes files.
    pub path: Option<PathBuf>,
    pub rows: usize,
    /// BLAKE3 hex digest of the rendered CSV text.
    pub output_hash: String,
}

/// Destination for output windows, keyed by instrument id.
pub trait WindowSink {
    /// Serialize one instrument's window.
    fn emit(&mut self, instrument_id: &str, window: &[MonthlyRecord])
        -> Result<EmitReceipt, EmitError>;
}

/// Render a window as CSV text with the standard header.
pub fn render_window_csv(window: &[MonthlyRecord]) -> Result<String, EmitError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(OUTPUT_COLUMNS)?;

    for r in window {
        let ind = &r.indicators;
        wtr.write_record([
            r.instrument_id.clone(),
            r.month_end_date.format("%Y-%m-%d").to_string(),
            format_value(r.open),
            format_value(r.high),
            format_value(r.low),
            format_value(r.close),
            format_optional(ind.sma_10),
            format_optional(ind.sma_20),
            format_optional(ind.ema_10),
            format_optional(ind.ema_20),
        ])?;
    }

    let data = wtr.into_inner().map_err(|e| EmitError::Flush(e.to_string()))?;
    String::from_utf8(data).map_err(|e| EmitError::Flush(e.to_string()))
}

/// Shortest round-trip text for a float, always with a decimal point.
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_default()
}

/// File-system safe form of an instrument id.
pub fn file_stem(instrument_id: &str) -> String {
    instrument_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// File name stem that stays distinct per instrument id.
///
/// Ids that `file_stem` leaves untouched are used as is. Any other id gets a
/// short BLAKE3 suffix of the raw id, so `A/B` and `A_B` land in different files.
pub fn unique_stem(instrument_id: &str) -> String {
    let stem = file_stem(instrument_id);
    if stem == instrument_id {
        return stem;
    }
    let digest = blake3::hash(instrument_id.as_bytes()).to_hex();
    format!("{stem}-{}", &digest[..8])
}

// ─── Directory sink ─────────────────────────────────────────────────

/// Writes `<output_dir>/<prefix><ticker>.csv` per instrument.
///
/// Refuses to write a second instrument to a path it already wrote this run.
#[derive(Debug, Clone)]
pub struct CsvDirSink {
    output_dir: PathBuf,
    prefix: String,
    written: BTreeMap<PathBuf, String>,
}

impl CsvDirSink {
    /// Create the sink, creating `output_dir` if needed.
    pub fn create(output_dir: &Path, prefix: &str) -> Result<Self, EmitError> {
        std::fs::create_dir_all(output_dir).map_err(|source| EmitError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            prefix: prefix.to_string(),
            written: BTreeMap::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the window for `instrument_id` is written to.
    pub fn path_for(&self, instrument_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.csv", self.prefix, unique_stem(instrument_id)))
    }
}

impl WindowSink for CsvDirSink {
    fn emit(
        &mut self,
        instrument_id: &str,
        window: &[MonthlyRecord],
    ) -> Result<EmitReceipt, EmitError> {
        let path = self.path_for(instrument_id);
        if let Some(existing) = self.written.get(&path) {
            if existing != instrument_id {
                return Err(EmitError::PathCollision {
                    instrument_id: instrument_id.to_string(),
                    existing: existing.clone(),
                    path,
                });
            }
        }

        let text = render_window_csv(window)?;
        std::fs::write(&path, &text).map_err(|source| EmitError::Write {
            path: path.clone(),
            source,
        })?;
        self.written.insert(path.clone(), instrument_id.to_string());
        Ok(EmitReceipt {
            path: Some(path),
            rows: window.len(),
            output_hash: blake3::hash(text.as_bytes()).to_hex().to_string(),
        })
    }
}

// ─── In-memory sink ─────────────────────────────────────────────────

/// Keeps rendered CSV text per instrument.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowSink for MemorySink {
    fn emit(
        &mut self,
        instrument_id: &str,
        window: &[MonthlyRecord],
    ) -> Result<EmitReceipt, EmitError> {
        let text = render_window_csv(window)?;
        let output_hash = blake3::hash(text.as_bytes()).to_hex().to_string();
        self.files.insert(instrument_id.to_string(), text);
        Ok(EmitReceipt {
            path: None,
            rows: window.len(),
            output_hash,
        })
    }
}
