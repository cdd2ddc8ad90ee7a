//! Daily bundle cache.
//!
//! One record per day, overwritten on each successful save; stale records
//! are never returned, just superseded. The store sits behind the
//! [`BundleStore`] trait so the validation loop works the same over the
//! JSON file used in production and the in-memory store used in tests.
//!
//! # Cache layout
//!
//! The file backend keeps a single pretty-printed JSON record:
//!
//! ```text
//! { "date": "2025-05-06", "title": ..., "url": ..., "summary": ...,
//!   "summary_ko": ..., "keywords": [...], "expressions": [...] }
//! ```

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::models::NewsBundle;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read cache file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode bundle: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key-value view of the daily cache: at most one bundle per date.
pub trait BundleStore {
    /// The stored bundle, only if its date equals `date`.
    async fn get(&self, date: NaiveDate) -> Result<Option<NewsBundle>, StoreError>;
    /// Overwrite the single slot with `bundle`.
    async fn put(&self, bundle: &NewsBundle) -> Result<(), StoreError>;
}

/// Single-file JSON store.
///
/// A corrupt or unreadable record is treated as absent rather than fatal;
/// the pipeline will simply rebuild today's bundle and overwrite it.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl BundleStore for JsonFileStore {
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display(), %date))]
    async fn get(&self, date: NaiveDate) -> Result<Option<NewsBundle>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path_str(),
                    source,
                });
            }
        };

        let bundle: NewsBundle = match serde_json::from_str(&raw) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(error = %e, "Cache file is not a valid bundle; treating as absent");
                return Ok(None);
            }
        };

        if bundle.date != date {
            debug!(stored = %bundle.date, "Cached bundle is stale");
            return Ok(None);
        }
        Ok(Some(bundle))
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), date = %bundle.date))]
    async fn put(&self, bundle: &NewsBundle) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(bundle)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| {
                StoreError::Write {
                    path: self.path_str(),
                    source,
                }
            })?;
        }

        // Write-then-rename so a run killed mid-write never leaves a
        // half-record behind.
        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, json).await.map_err(|source| {
            StoreError::Write {
                path: tmp_path.display().to_string(),
                source,
            }
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|source| {
            StoreError::Write {
                path: self.path_str(),
                source,
            }
        })?;

        info!("Cached today's bundle");
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// In-memory single-slot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<NewsBundle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(bundle: NewsBundle) -> Self {
        Self {
            slot: Mutex::new(Some(bundle)),
        }
    }
}

impl BundleStore for MemoryStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<NewsBundle>, StoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap()
            .clone()
            .filter(|bundle| bundle.date == date))
    }

    async fn put(&self, bundle: &NewsBundle) -> Result<(), StoreError> {
        *self.slot.lock().unwrap() = Some(bundle.clone());
        Ok(())
    }
}
