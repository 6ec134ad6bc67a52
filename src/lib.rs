//! Date Sorter - copies a tree of files into a date-partitioned layout
//!
//! The pipeline has three parts:
//! - date resolution (EXIF metadata, falling back to modification time)
//! - recursive classification of the source tree by resolved date
//! - deterministic placement into `dest/Y/M/D`, `dest/err` or the
//!   others directory, with periodic progress reporting

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod place;
pub mod process;
pub mod progress;
pub mod time;

pub use classify::{Classification, DateIndex, FileRecord, classify};
pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use place::{PlacementReport, PlacementSummary, Placer, copy_file};
pub use process::{SortSummary, Sorter};
pub use progress::{Progress, ProgressReporter};
pub use time::{CalendarDate, ResolvedDate, TimeSource, resolve};
