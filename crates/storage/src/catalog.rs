use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use trainer_core::model::{Catalog, CatalogError};

/// Reasons the training content cannot be used. All of them stop start-up.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("cannot read catalog {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("catalog {path} is not valid: {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Read, parse and validate the catalog at `path`.
///
/// Task-text collisions are not fatal; they are logged as warnings because
/// progress would treat the colliding tasks as one.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the file is missing, unreadable, not valid
/// JSON for the catalog schema, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&raw).map_err(|err| match err {
        CatalogLoadError::Parse { source, .. } => CatalogLoadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    info!(
        path = %path.display(),
        modules = catalog.modules().len(),
        tests = catalog.tests().len(),
        scenarios = catalog.scenarios().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Parse and validate catalog JSON that is already in memory.
///
/// # Errors
///
/// Returns `CatalogLoadError::Parse` or `CatalogLoadError::Invalid`.
pub fn parse_catalog(raw: &str) -> Result<Catalog, CatalogLoadError> {
    let catalog: Catalog =
        serde_json::from_str(raw).map_err(|source| CatalogLoadError::Parse {
            path: PathBuf::new(),
            source,
        })?;
    catalog.validate()?;

    for key in catalog.duplicate_task_keys() {
        warn!(task = %key, "task text appears more than once; progress cannot tell these apart");
    }
    Ok(catalog)
}
