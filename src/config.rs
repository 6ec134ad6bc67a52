//! Configuration types for the date sorter

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the date sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for files
    pub source_dir: PathBuf,

    /// Root of the `year/month/day` tree (and of the `err` bucket)
    pub dest_dir: PathBuf,

    /// Directory receiving files that could not be opened for dating
    pub other_dir: PathBuf,

    /// Seconds between two background progress lines
    pub progress_interval_secs: u64,

    /// Extensions whose embedded EXIF metadata is decoded
    pub image_extensions: Vec<String>,

    /// Copy the source modification time onto each copied file
    pub preserve_mtime: bool,

    /// Optional log file, written in addition to stderr
    pub log_file: Option<PathBuf>,

    /// Write the log file as JSON lines
    pub json_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./source"),
            dest_dir: PathBuf::from("./dest"),
            other_dir: PathBuf::from("./others"),
            progress_interval_secs: 5,
            image_extensions: vec![
                "jpg".into(), "jpeg".into(), "png".into(), "webp".into(),
                "heic".into(), "heif".into(), "avif".into(), "tiff".into(), "tif".into(),
                "arw".into(), "cr2".into(), "nef".into(), "orf".into(), "rw2".into(),
                "dng".into(), "pef".into(), "srw".into(),
            ],
            preserve_mtime: true,
            log_file: None,
            json_log: false,
        }
    }
}

impl Config {
    /// Check if embedded metadata should be decoded for this extension
    pub fn is_image(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.image_extensions.iter().any(|e| e.to_lowercase() == ext_lower)
    }

    /// Interval between background progress reports
    pub fn progress_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.progress_interval_secs.max(1))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}
