//! Pipeline runner: wires loader, core and emitter together.
//!
//! Two entry points:
//! - `run_pipeline()`: load from the configured input, write CSVs (and an
//!   optional manifest) into the configured directory. Used by the CLI.
//! - `emit_windows()`: take already-loaded data and any `WindowSink`.
//!
//! An emit failure for one instrument is recorded in the summary and the run
//! moves on to the next instrument.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use monthlab_core::{build_series, output_window, OUTPUT_WINDOW_LEN};

use crate::config::{ConfigError, PipelineConfig};
use crate::data_loader::{load_observations, LoadError, LoadReport, LoadedData};
use crate::export::{CsvDirSink, EmitError, WindowSink};

/// Current schema version of `manifest.json`.
pub const SCHEMA_VERSION: u32 = 1;

/// Manifest file name inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors that stop a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("failed to write manifest '{path}': {reason}")]
    Manifest { path: PathBuf, reason: String },
}

/// Per-instrument result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentOutcome {
    pub instrument_id: String,
    /// Monthly records before windowing.
    pub monthly_records: usize,
    pub rows_written: usize,
    pub path: Option<PathBuf>,
    pub output_hash: String,
}

/// An instrument whose output could not be emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFailure {
    pub instrument_id: String,
    pub error: String,
}

/// Summary of one run, persisted as `manifest.json` when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub input_hash: String,
    pub load: LoadReport,
    pub instruments: Vec<InstrumentOutcome>,
    pub failures: Vec<InstrumentFailure>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn rows_written(&self) -> usize {
        self.instruments.iter().map(|i| i.rows_written).sum()
    }
}

/// Run the whole pipeline for a config.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary, RunError> {
    config.validate()?;

    let loaded = load_observations(&config.input, config.reject_policy)?;
    let mut sink = CsvDirSink::create(&config.output_dir, &config.file_prefix)?;
    info!(output_dir = %sink.output_dir().display(), "writing monthly windows");

    let summary = emit_windows(loaded, &mut sink);

    if config.write_manifest {
        let path = write_manifest(&summary, &config.output_dir)?;
        info!(manifest = %path.display(), "manifest written");
    }

    info!(
        instruments = summary.instruments.len(),
        failures = summary.failures.len(),
        rows_written = summary.rows_written(),
        "run complete"
    );
    Ok(summary)
}

/// Aggregate, compute indicators, window and emit every instrument.
pub fn emit_windows(loaded: LoadedData, sink: &mut dyn WindowSink) -> RunSummary {
    let series = build_series(&loaded.observations);

    let mut instruments = Vec::with_capacity(series.len());
    let mut failures = Vec::new();

    for (instrument_id, records) in &series {
        let window = output_window(records, OUTPUT_WINDOW_LEN);
        debug!(
            instrument = %instrument_id,
            monthly_records = records.len(),
            window = window.len(),
            "instrument aggregated"
        );

        match sink.emit(instrument_id, window) {
            Ok(receipt) => {
                if let Some(path) = &receipt.path {
                    info!(instrument = %instrument_id, rows = receipt.rows, path = %path.display(), "wrote window");
                }
                instruments.push(InstrumentOutcome {
                    instrument_id: instrument_id.clone(),
                    monthly_records: records.len(),
                    rows_written: receipt.rows,
                    path: receipt.path,
                    output_hash: receipt.output_hash,
                });
            }
            Err(e) => {
                error!(instrument = %instrument_id, error = %e, "failed to emit window");
                failures.push(InstrumentFailure {
                    instrument_id: instrument_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    RunSummary {
        schema_version: SCHEMA_VERSION,
        input_hash: loaded.input_hash,
        load: loaded.report,
        instruments,
        failures,
    }
}

/// Write the summary as pretty JSON into `output_dir`.
pub fn write_manifest(summary: &RunSummary, output_dir: &Path) -> Result<PathBuf, RunError> {
    let path = output_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(summary).map_err(|e| RunError::Manifest {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    std::fs::write(&path, json).map_err(|e| RunError::Manifest {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{load_from_reader, RejectPolicy};
    use crate::export::{EmitReceipt, MemorySink};
    use monthlab_core::MonthlyRecord;

    const TWO_INSTRUMENTS: &str = "ticker,date,open,high,low,close\n\
        AAA,2024-01-02,1,2,0.5,1.5\n\
        AAA,2024-02-02,1.5,3,1,2.5\n\
        BBB,2024-01-03,10,11,9,10\n";

    fn loaded(csv: &str) -> LoadedData {
        let (observations, report) = load_from_reader(csv.as_bytes(), RejectPolicy::Skip).unwrap();
        LoadedData {
            observations,
            report,
            input_hash: "test".into(),
        }
    }

    /// Fails for one instrument, delegates to memory for the rest.
    struct FailingSink {
        fail_on: &'static str,
        inner: MemorySink,
    }

    impl WindowSink for FailingSink {
        fn emit(
            &mut self,
            instrument_id: &str,
            window: &[MonthlyRecord],
        ) -> Result<EmitReceipt, EmitError> {
            if instrument_id == self.fail_on {
                return Err(EmitError::Flush("disk full".into()));
            }
            self.inner.emit(instrument_id, window)
        }
    }

    #[test]
    fn emits_every_instrument_in_order() {
        let mut sink = MemorySink::new();
        let summary = emit_windows(loaded(TWO_INSTRUMENTS), &mut sink);

        assert!(summary.all_succeeded());
        let ids: Vec<&str> = summary
            .instruments
            .iter()
            .map(|i| i.instrument_id.as_str())
            .collect();
        assert_eq!(ids, vec!["AAA", "BBB"]);
        assert_eq!(summary.instruments[0].monthly_records, 2);
        assert_eq!(summary.rows_written(), 3);
        assert_eq!(sink.files["AAA"].lines().count(), 3);
    }

    #[test]
    fn one_failing_instrument_does_not_block_others() {
        let mut sink = FailingSink {
            fail_on: "AAA",
            inner: MemorySink::new(),
        };
        let summary = emit_windows(loaded(TWO_INSTRUMENTS), &mut sink);

        assert!(!summary.all_succeeded());
        assert_eq!(summary.failures[0].instrument_id, "AAA");
        assert!(summary.failures[0].error.contains("disk full"));
        assert_eq!(summary.instruments.len(), 1);
        assert!(sink.inner.files.contains_key("BBB"));
    }

    #[test]
    fn empty_input_emits_nothing() {
        let mut sink = MemorySink::new();
        let summary = emit_windows(loaded("ticker,date,open,high,low,close\n"), &mut sink);
        assert!(summary.instruments.is_empty());
        assert!(sink.files.is_empty());
    }

    #[test]
    fn manifest_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = MemorySink::new();
        let summary = emit_windows(loaded(TWO_INSTRUMENTS), &mut sink);

        let path = write_manifest(&summary, dir.path()).unwrap();
        let back: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, summary);
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }
}
