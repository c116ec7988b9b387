//! Shared error types for the services crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use storage::{CatalogLoadError, StorageError};
use trainer_core::model::ProgressError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("no progress record for user {0:?}")]
    UnknownUser(String),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PracticeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("module {0} does not exist")]
    UnknownModule(String),
    #[error("module {module} has no command {command}")]
    UnknownCommand { module: String, command: String },
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}

/// Errors emitted by test sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("test level {0} does not exist")]
    UnknownLevel(String),
    #[error("test level {0} has no questions yet")]
    NoQuestions(String),
    #[error("test already finished")]
    Completed,
    #[error("only {answered} of {total} questions answered")]
    Unfinished { answered: usize, total: usize },
    #[error("option {choice} is out of range 1..={options}")]
    ChoiceOutOfRange { choice: usize, options: usize },
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}

/// Errors emitted by scenario sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScenarioError {
    #[error("scenario {0} does not exist")]
    UnknownScenario(String),
    #[error("scenario already finished")]
    Completed,
    #[error("scenario still has {remaining} steps to go")]
    Unfinished { remaining: usize },
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}

/// Errors emitted by report sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("cannot write report to {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("report could not be rendered: {0}")]
    Render(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping trainer services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}
