//! Where finished sheets go.
//!
//! A store receives PNG bytes under a key and answers with the address the
//! sheet can be fetched from later. Stores never overwrite an existing key.

use std::future::Future;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write sheet to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage backends selectable from the command line and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    /// Write PNG files into the output directory.
    #[default]
    Fs,
    /// Inline each sheet as a `data:image/png;base64,` URL.
    DataUrl,
}

pub trait SheetStore: Send + Sync {
    /// Store `png` under `key` and return its address.
    fn put(
        &self,
        key: &str,
        png: &[u8],
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Drop a sheet previously stored under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Storage key for one page of a split started at `timestamp_ms`.
pub fn sheet_key(timestamp_ms: i64, page_number: u8) -> String {
    format!("split-{}-page-{}.png", timestamp_ms, page_number)
}

#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SheetStore for FsStore {
    async fn put(&self, key: &str, png: &[u8]) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(key);
        write_new(&path, png)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = png.len(), "Wrote sheet");
        Ok(path.display().to_string())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.dir.join(key);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }
}

/// Create `path` and write `contents`, failing if the file already exists.
pub(crate) async fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.flush().await
}

/// Keeps nothing; the address is the sheet itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlStore;

impl SheetStore for DataUrlStore {
    async fn put(&self, _key: &str, png: &[u8]) -> Result<String, StoreError> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Either backend, chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyStore {
    Fs(FsStore),
    DataUrl(DataUrlStore),
}

impl AnyStore {
    pub fn new(kind: StoreKind, dir: &Path) -> Self {
        match kind {
            StoreKind::Fs => AnyStore::Fs(FsStore::new(dir)),
            StoreKind::DataUrl => AnyStore::DataUrl(DataUrlStore),
        }
    }
}

impl SheetStore for AnyStore {
    async fn put(&self, key: &str, png: &[u8]) -> Result<String, StoreError> {
        match self {
            AnyStore::Fs(store) => store.put(key, png).await,
            AnyStore::DataUrl(store) => store.put(key, png).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Fs(store) => store.remove(key).await,
            AnyStore::DataUrl(store) => store.remove(key).await,
        }
    }
}
