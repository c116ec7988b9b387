use thiserror::Error;

use services::ProgressServiceError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShellError {
    /// Standard input reached end of file.
    #[error("input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}
