//! Monthlab Runner: batch orchestration around `monthlab-core`.
//!
//! This crate provides:
//! - CSV loading with malformed-row rejection and stable sorting
//! - Per-instrument CSV emission behind the `WindowSink` trait
//! - TOML pipeline configuration
//! - The run loop and its JSON manifest
//! - Deterministic synthetic datasets

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod synthetic;

pub use config::{ConfigError, PipelineConfig};
pub use data_loader::{
    load_from_reader, load_observations, LoadError, LoadReport, LoadedData, RejectPolicy,
    RowRejection,
};
pub use export::{
    render_window_csv, CsvDirSink, EmitError, EmitReceipt, MemorySink, WindowSink,
    DEFAULT_FILE_PREFIX, OUTPUT_COLUMNS,
};
pub use runner::{
    emit_windows, run_pipeline, write_manifest, InstrumentFailure, InstrumentOutcome, RunError,
    RunSummary, MANIFEST_FILE, SCHEMA_VERSION,
};
pub use synthetic::{generate_dataset, generate_synthetic_observations, write_dataset_csv};
