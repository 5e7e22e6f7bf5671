//! Per-location write serialization.
//!
//! The write → transform → overwrite → read-back sequence for one cache
//! location must not interleave with another request for the same
//! location. Entries are created on demand and dropped once the last
//! holder releases them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async mutex table keyed by cache location.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    inner: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `location`.
    pub async fn acquire(&self, location: &Path) -> PathGuard {
        let mutex = self
            .inner
            .entry(location.to_path_buf())
            .or_default()
            .clone();
        let guard = mutex.lock_owned().await;

        PathGuard {
            locks: self.inner.clone(),
            location: location.to_path_buf(),
            guard: Some(guard),
        }
    }

    /// Number of locations currently locked or awaited.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one location; released on drop.
#[derive(Debug)]
pub struct PathGuard {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
    location: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table itself still references an idle mutex.
        self.locks
            .remove_if(&self.location, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
