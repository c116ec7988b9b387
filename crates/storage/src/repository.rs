use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use trainer_core::model::ProgressRecord;

/// Every user's record, keyed by user name. Sorted so the file diffs cleanly.
pub type ProgressMap = BTreeMap<String, ProgressRecord>;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cannot access {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("progress file {path} is malformed: {source}", path = .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Repository contract for the progress store.
///
/// The whole map is read once at start-up and written back in full after every
/// change; there is no partial update.
pub trait ProgressRepository: Send + Sync {
    /// Load every user's record. A store that does not exist yet is empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store exists but cannot be read or decoded.
    fn load_all(&self) -> Result<ProgressMap, StorageError>;

    /// Replace the stored map with `progress`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the map cannot be written.
    fn save_all(&self, progress: &ProgressMap) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<ProgressMap>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_progress(progress: ProgressMap) -> Self {
        Self {
            progress: Arc::new(Mutex::new(progress)),
            saves: Arc::new(Mutex::new(0)),
        }
    }

    /// How many times `save_all` has been called.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn save_count(&self) -> Result<usize, StorageError> {
        let guard = self
            .saves
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }
}

impl ProgressRepository for InMemoryRepository {
    fn load_all(&self) -> Result<ProgressMap, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone_from(progress);
        let mut saves = self
            .saves
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *saves += 1;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress: repo }
    }
}
