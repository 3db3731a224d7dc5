//! Pipeline configuration.
//!
//! Input location, output location and loader/emitter options for one run.
//! Window sizes and the output length are constants of `monthlab-core`, not
//! configuration.
//!
//! ```toml
//! input = "data/daily.csv"
//! output_dir = "out"
//! file_prefix = "result_"
//! reject_policy = "skip"
//! write_manifest = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data_loader::RejectPolicy;
use crate::export::DEFAULT_FILE_PREFIX;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Daily CSV input.
    pub input: PathBuf,

    /// Directory receiving one CSV per instrument.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default)]
    pub reject_policy: RejectPolicy,

    /// Also write `manifest.json` into `output_dir`.
    #[serde(default)]
    pub write_manifest: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

impl PipelineConfig {
    /// Defaults for everything but the input path.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            reject_policy: RejectPolicy::default(),
            write_manifest: false,
        }
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input path is empty".into()));
        }
        if self.file_prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(ConfigError::Invalid(format!(
                "file_prefix '{}' must not contain path separators",
                self.file_prefix
            )));
        }
        Ok(())
    }
}
