//! JSON backups of the whole application state.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quiz_core::{Clock, QuestionStore};
use storage::StateRecord;
use tracing::info;

use crate::error::ExportError;

/// `quiz-backup-YYYY-MM-DD.json`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("quiz-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the store in the same schema used for the persisted snapshot.
///
/// # Errors
///
/// Returns `ExportError::Storage` if serialization fails.
pub fn export_json(store: &QuestionStore) -> Result<String, ExportError> {
    Ok(StateRecord::from_store(store).to_json_pretty()?)
}

/// Write a dated backup into `dir` and return its path.
///
/// # Errors
///
/// Returns `ExportError::Io` if the directory or file cannot be written.
pub fn write_export(dir: &Path, store: &QuestionStore, clock: &Clock) -> Result<PathBuf, ExportError> {
    let json = export_json(store)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(clock.today()));
    std::fs::write(&path, json)?;
    info!(path = %path.display(), questions = store.len(), "exported backup");
    Ok(path)
}

/// Rebuild a store from a backup document.
///
/// # Errors
///
/// Returns `ExportError::Parse` if `raw` is not a valid backup.
pub fn parse_backup(raw: &str) -> Result<QuestionStore, ExportError> {
    StateRecord::from_json(raw)
        .and_then(StateRecord::into_store)
        .map_err(ExportError::Parse)
}
