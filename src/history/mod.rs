//! Submission history (dedup ledger)
//!
//! This module records which URLs each platform has already accepted for a
//! domain, so later runs only submit what is new. Records live in
//! append-only text files under `<data-dir>/submitted/<domain>/<platform>.txt`
//! and are cached in memory.

mod store;

pub use store::HistoryStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing history files
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create history directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid domain '{0}': must be a bare host name")]
    InvalidDomain(String),

    #[error("Failed to remove history directory {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Checks that `domain` can name a directory under `submitted/`
///
/// Rejects empty names, `.`, anything containing `..` and anything with a
/// path separator, so a domain never resolves outside its own directory.
pub fn check_domain(domain: &str) -> HistoryResult<()> {
    let trimmed = domain.trim();
    let invalid = trimmed.is_empty()
        || trimmed != domain
        || domain == "."
        || domain.contains("..")
        || domain.contains(['/', '\\']);

    if invalid {
        Err(HistoryError::InvalidDomain(domain.to_string()))
    } else {
        Ok(())
    }
}
