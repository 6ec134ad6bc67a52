//! Error types for the date sorter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for date sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the date sorter
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to read modification time of {path}: {source}")]
    ModTime {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Not a regular file: {path}")]
    NotRegularFile { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to copy {src} to {dst}: {source}")]
    CopyStream {
        src: PathBuf,
        dst: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl Error {
    /// Whether this error means the file could not be opened at all
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Error::Open { .. })
    }
}
