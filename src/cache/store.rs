//! On-disk artifact store.
//!
//! Blobs live at `<root>/<segment>/…/<file>`, a direct mirror of the
//! request path, so the tree can be inspected by hand. There is no index,
//! no metadata and no eviction.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tokio::fs;

use super::path::RequestPath;

/// Filesystem failure while touching the cache tree.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("path {0} has no file component to cache")]
    NoLocation(String),
    #[error("cache I/O at {}: {source}", .location.display())]
    Io {
        location: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    fn io(location: &Path, source: io::Error) -> Self {
        Self::Io {
            location: location.to_path_buf(),
            source,
        }
    }
}

/// Path-keyed blob storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File backing `path`, or `None` for directory-like paths.
    pub fn location(&self, path: &RequestPath) -> Option<PathBuf> {
        path.under(&self.root)
    }

    /// Write or overwrite the blob for `path`, creating parent directories.
    pub async fn put(&self, path: &RequestPath, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        let location = self
            .location(path)
            .ok_or_else(|| CacheError::NoLocation(path.to_string()))?;

        if let Some(parent) = location.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::io(parent, e))?;
        }
        fs::write(&location, bytes)
            .await
            .map_err(|e| CacheError::io(&location, e))?;

        tracing::trace!(path = %path, location = %location.display(), bytes = bytes.len(), "Cache blob written");
        Ok(location)
    }

    /// Read the blob for `path`; `None` when nothing is stored.
    pub async fn get(&self, path: &RequestPath) -> Result<Option<Bytes>, CacheError> {
        let Some(location) = self.location(path) else {
            return Ok(None);
        };
        match fs::read(&location).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&location, e)),
        }
    }
}
