//! `SQLite` URL handling for the binary. Kept out of storage so library crates stay path-agnostic.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

pub const MEMORY_URL: &str = "sqlite::memory:";

/// Turn `quiz.sqlite3`, `sqlite:quiz.sqlite3` or `sqlite://quiz.sqlite3` into an
/// absolute `sqlite://` URL. Query parameters are kept.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL {
        return trimmed.to_owned();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

/// Create the database file (and its directory) so the pool can open it.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == MEMORY_URL {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}
