use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbxError>;

#[derive(Error, Debug)]
pub enum DbxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    ArgumentError { message: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Listing '{path}' failed: {message}")]
    ListingFailed { path: String, message: String },

    #[error("Download of '{path}' failed: {message}")]
    DownloadFailed { path: String, message: String },

    #[error("Writing '{}' failed: {source}", path.display())]
    LocalWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dropbox API error ({status}): {summary}")]
    Api { status: u16, summary: String },

    #[error("No files found under '{path}'")]
    NothingToDownload { path: String },

    #[error("{failed} of {total} file(s) failed to download")]
    IncompleteTransfer { failed: usize, total: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },
}

impl DbxError {
    pub fn argument_error<S: Into<String>>(message: S) -> Self {
        DbxError::ArgumentError {
            message: message.into(),
        }
    }

    pub fn invalid_path<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        DbxError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error<S: Into<String>>(message: S) -> Self {
        DbxError::ConfigError {
            message: message.into(),
        }
    }
}
