//! Shared error type for the export operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from `get_info`, `get_db`, and `get_code`.
///
/// File creation and code write failures are fatal (see [`ExportError::is_fatal`]);
/// everything else concerns a single user or project and a driver may move on.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("Could not decode JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    // Not found
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Project not found: {name}")]
    ProjectNotFound { name: String },

    // Filesystem
    #[error("Cannot create output file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to download into {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write code to {path}: {source}")]
    WriteCode {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExportError {
    /// True when the output set can no longer be trusted and the run should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExportError::CreateFile { .. } | ExportError::WriteCode { .. }
        )
    }
}
