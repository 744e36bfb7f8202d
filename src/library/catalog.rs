//! Catalog of files posted to the source channel.
//!
//! Simple JSON-based index mapping a title key to the Telegram file id
//! that can be re-sent to users. The whole file is rewritten after every
//! insert.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use tokio::fs;

/// Errors that can occur with the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Refusing to store an empty file reference for key: {0:?}")]
    EmptyFileReference(String),
}

/// Derive the catalog key from an uploaded file name.
///
/// Only the final extension segment is removed, so `"a.b.mkv"` becomes
/// `"a.b"` and a bare `".mkv"` becomes the empty string.
pub fn derive_key(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name.to_string(),
    }
}

/// Catalog store owning the key → file reference mapping and its file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    /// Path of the JSON file backing the catalog
    path: PathBuf,

    /// Entries in insertion order
    entries: IndexMap<String, String>,
}

impl CatalogStore {
    /// Create an empty catalog bound to `path` without touching disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: IndexMap::new(),
        }
    }

    /// Load the catalog from disk.
    ///
    /// Any failure yields an empty catalog so the bot can still start and
    /// accept new uploads.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        match Self::try_load(&path).await {
            Ok(store) => store,
            Err(CatalogError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No catalog at {}, starting empty", path.display());
                Self::new(path)
            }
            Err(e) => {
                tracing::warn!("Catalog {} unreadable, starting empty: {}", path.display(), e);
                Self::new(path)
            }
        }
    }

    /// Strict load that reports why the catalog could not be read
    pub async fn try_load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).await?;
        let raw: IndexMap<String, String> = serde_json::from_str(&content)?;

        let entries = raw
            .into_iter()
            .filter(|(_, file_ref)| !file_ref.is_empty())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Insert or overwrite an entry, then rewrite the catalog file
    pub async fn insert(
        &mut self,
        key: impl Into<String>,
        file_reference: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let key = key.into();
        let file_reference = file_reference.into();

        if file_reference.is_empty() {
            return Err(CatalogError::EmptyFileReference(key));
        }

        self.entries.insert(key, file_reference);
        self.save().await
    }

    /// Write the whole catalog to disk
    async fn save(&self) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content).await?;

        Ok(())
    }

    /// Get the file reference stored under `key`
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
