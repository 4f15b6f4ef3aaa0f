//! Configuration: an optional TOML file, overridden by command-line flags.
//!
//! ```toml
//! [upload]
//! max_file_size_mb = 10
//!
//! [split]
//! target_width_inches = 6.5
//! rotation_degrees = 0
//! overlap_mm = 0
//! overlay = false
//!
//! [output]
//! dir = "out"
//! store = "fs"        # or "data-url"
//!
//! [fetch]
//! timeout_seconds = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stencil_core::{ImageSettings, UploadLimits};
use thiserror::Error;

use crate::store::StoreKind;

const DEFAULT_OUTPUT_DIR: &str = "stencil-out";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub upload: UploadSection,
    pub split: SplitSection,
    pub output: OutputSection,
    pub fetch: FetchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSection {
    pub max_file_size_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitSection {
    pub target_width_inches: Option<f64>,
    pub rotation_degrees: Option<f64>,
    pub overlap_mm: Option<u32>,
    pub overlay: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
    pub store: Option<StoreKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSection {
    pub timeout_seconds: Option<u64>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, otherwise start from an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map(Self::from_file).transpose().map(Option::unwrap_or_default)
    }
}

/// Values given on the command line. `None` defers to the file, then to the
/// built-in default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub target_width_inches: Option<f64>,
    pub rotation_degrees: Option<f64>,
    pub overlap_mm: Option<u32>,
    pub overlay: bool,
    pub output_dir: Option<PathBuf>,
    pub store: Option<StoreKind>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub limits: UploadLimits,
    pub settings: ImageSettings,
    pub overlay: bool,
    pub output_dir: PathBuf,
    pub store: StoreKind,
    pub fetch_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limits: UploadLimits::default(),
            settings: ImageSettings::default(),
            overlay: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            store: StoreKind::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Merge flags over the file over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero upload limit or timeout.
    pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let limits = match file.upload.max_file_size_mb {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "upload.max_file_size_mb",
                    message: "must be at least 1".to_string(),
                })
            }
            Some(mb) => UploadLimits {
                max_bytes: mb.saturating_mul(BYTES_PER_MB),
            },
            None => defaults.limits,
        };

        let fetch_timeout = match file.fetch.timeout_seconds {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "fetch.timeout_seconds",
                    message: "must be at least 1".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.fetch_timeout,
        };

        let base = defaults.settings;
        let settings = ImageSettings {
            target_width_inches: overrides
                .target_width_inches
                .or(file.split.target_width_inches)
                .unwrap_or(base.target_width_inches),
            rotation_degrees: overrides
                .rotation_degrees
                .or(file.split.rotation_degrees)
                .unwrap_or(base.rotation_degrees),
            overlap_mm: overrides
                .overlap_mm
                .or(file.split.overlap_mm)
                .unwrap_or(base.overlap_mm),
            dpi: base.dpi,
        };

        Ok(Self {
            limits,
            settings,
            overlay: overrides.overlay || file.split.overlay.unwrap_or(false),
            output_dir: overrides
                .output_dir
                .clone()
                .or_else(|| file.output.dir.clone())
                .unwrap_or(defaults.output_dir),
            store: overrides.store.or(file.output.store).unwrap_or(defaults.store),
            fetch_timeout,
        })
    }
}
