use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::repository::{ProgressMap, ProgressRepository, Storage, StorageError};

/// Progress store backed by one pretty-printed JSON document.
///
/// The document maps user names to progress records. Saves write a sibling
/// temp file and rename it over the original so a crash never leaves half a
/// document behind.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressRepository for JsonProgressStore {
    fn load_all(&self) -> Result<ProgressMap, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no progress file yet, starting empty");
                return Ok(ProgressMap::new());
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };

        if raw.trim().is_empty() {
            return Ok(ProgressMap::new());
        }

        let progress: ProgressMap =
            serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), users = progress.len(), "progress loaded");
        Ok(progress)
    }

    fn save_all(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let mut body = serde_json::to_string_pretty(progress)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        body.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).map_err(|e| StorageError::io(&temp, e))?;
        file.write_all(body.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| StorageError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        debug!(path = %self.path.display(), users = progress.len(), "progress saved");
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` whose progress lives in a JSON file at `path`.
    ///
    /// Nothing is touched on disk until the first load or save.
    #[must_use]
    pub fn json(path: impl Into<PathBuf>) -> Self {
        let repo: Arc<dyn ProgressRepository> = Arc::new(JsonProgressStore::new(path));
        Self { progress: repo }
    }
}
