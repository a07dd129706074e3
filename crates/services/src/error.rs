//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::StoreError;
use storage::StorageError;

/// Errors emitted by the quiz session state machine and its controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("nothing to practice")]
    Empty,
    #[error("a session is already running")]
    AlreadyActive,
    #[error("no session is running")]
    NotActive,
    #[error("the current question has not been answered yet")]
    NotAnswered,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `PersistenceGateway`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while importing a question sheet.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("could not read question sheet: {0}")]
    Parse(#[from] csv::Error),
    #[error("could not open question sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("question sheet contains no valid questions")]
    NoQuestions,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while exporting or restoring a backup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("invalid backup document: {0}")]
    Parse(#[source] StorageError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
