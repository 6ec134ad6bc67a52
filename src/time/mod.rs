//! Date resolution
//!
//! A file's date is resolved with this fallback chain:
//! 1. Open the file (a failure here is reported as [`Error::Open`])
//! 2. EXIF metadata (image formats only)
//! 3. File system modification time
//!
//! Step 3 is the floor: any file that exists and can be stat'ed gets a date.

pub mod exif;

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Local};
use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, warn};

/// A calendar day used as the partition key of the destination tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Take the calendar part of any chrono date or datetime
    pub fn from_datelike<D: Datelike>(value: &D) -> Self {
        Self::new(value.year(), value.month(), value.day())
    }
}

/// Formats as `Y-M-D` without zero padding, e.g. `2021-6-15`
impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

/// Source of the resolved date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Extracted from EXIF metadata
    Exif,
    /// From file system modification time
    FileSystem,
}

/// Outcome of a successful resolution
#[derive(Debug)]
pub struct ResolvedDate {
    /// The resolved calendar day
    pub date: CalendarDate,
    /// Where `date` came from
    pub source: TimeSource,
    /// Metadata decode failure that forced the modification-time fallback
    pub error: Option<Error>,
}

impl ResolvedDate {
    /// Whether metadata decoding failed and the date is only a fallback
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Resolve the calendar date of a file
///
/// Returns [`Error::Open`] when the file cannot be opened and
/// [`Error::ModTime`] when no date can be obtained at all. A metadata decode
/// failure is not an error: the modification-time date is returned with the
/// decode error attached.
pub fn resolve(path: &Path, config: &Config) -> Result<ResolvedDate> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            match modification_date(path) {
                Ok(date) => debug!(?path, %date, error = %source, "Cannot open file, modification time only"),
                Err(e) => debug!(?path, error = %e, "Cannot open file or read its modification time"),
            }
            return Err(Error::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !config.is_image(ext) {
        debug!(?path, "No metadata reader for this file type, using modification time");
        return Ok(ResolvedDate {
            date: modification_date(path)?,
            source: TimeSource::FileSystem,
            error: None,
        });
    }

    match exif::extract_exif_time(file, path) {
        Ok(timestamp) => {
            debug!(?path, %timestamp, "Extracted time from EXIF");
            Ok(ResolvedDate {
                date: CalendarDate::from_datelike(&timestamp),
                source: TimeSource::Exif,
                error: None,
            })
        }
        Err(e) => {
            debug!(?path, error = %e, "No usable EXIF time, falling back to modification time");
            let date = modification_date(path).inspect_err(|err| {
                warn!(?path, error = %err, "Modification time unavailable after EXIF failure");
            })?;
            Ok(ResolvedDate {
                date,
                source: TimeSource::FileSystem,
                error: Some(e),
            })
        }
    }
}

/// Local calendar date of the file's modification time
pub fn modification_date(path: &Path) -> Result<CalendarDate> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| Error::ModTime {
            path: path.to_path_buf(),
            source,
        })?;
    let local: DateTime<Local> = modified.into();
    Ok(CalendarDate::from_datelike(&local))
}
