//! The job manifest written next to the sheets.
//!
//! Each split gets its own manifest, named after the job timestamp like its
//! sheets, so jobs sharing an output directory never clobber each other.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stencil_core::{GridPosition, ImageSettings};
use thiserror::Error;

use crate::store::write_new;

/// Manifest file name for the job started at `timestamp_ms`.
pub fn manifest_key(timestamp_ms: i64) -> String {
    format!("split-{}.json", timestamp_ms)
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to serialize job manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write job manifest to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One stored sheet as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitImageRecord {
    pub url: String,
    pub position: GridPosition,
    pub page_number: u8,
}

/// Record of one completed split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobManifest {
    pub original_image_url: String,
    pub split_images: Vec<SplitImageRecord>,
    pub settings: ImageSettings,
    pub created_at: DateTime<Utc>,
}

impl JobManifest {
    /// Write the manifest as pretty JSON to `dir/file_name` and return its
    /// path. An existing file is never replaced.
    pub async fn write_to(&self, dir: &Path, file_name: &str) -> Result<PathBuf, ManifestError> {
        let json = serde_json::to_vec_pretty(self)?;
        let path = dir.join(file_name);

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ManifestError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        write_new(&path, &json)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
