//! Destination naming and file copying
//!
//! Layout produced:
//! - `dest/{Y}/{M}/{D}/{Y}-{M}-{D}-{i}.{ext}` for dated files
//! - `dest/err/{Y}-{M}-{D}-{i}.{ext}` for files whose metadata was unreadable
//! - `others/{file name}` for files that could not be dated
//!
//! `i` counts from 1 within one date and bucket, in walk order.

use crate::classify::{Classification, DateIndex};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::time::CalendarDate;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span};

/// Name of the error bucket under the destination root
pub const ERROR_DIR: &str = "err";

/// Buffer size used for both ends of a copy
const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// Outcome counters for one placement pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub copied: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl PlacementReport {
    fn record(&mut self, source: &Path, dest: &Path, result: Result<u64>) {
        match result {
            Ok(bytes) => {
                debug!(?source, ?dest, bytes, "Copied file");
                self.copied += 1;
                self.bytes += bytes;
            }
            Err(e) => {
                error!(?source, ?dest, error = %e, "Error copying file");
                self.failed += 1;
            }
        }
    }
}

/// Both placement passes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacementSummary {
    pub dated: PlacementReport,
    pub other: PlacementReport,
}

/// Copies classified files into the destination trees
pub struct Placer {
    dest_root: PathBuf,
    other_root: PathBuf,
    preserve_mtime: bool,
    progress: Progress,
}

impl Placer {
    pub fn new(dest_root: impl Into<PathBuf>, other_root: impl Into<PathBuf>, progress: Progress) -> Self {
        Self {
            dest_root: dest_root.into(),
            other_root: other_root.into(),
            preserve_mtime: true,
            progress,
        }
    }

    /// Copy the source modification time onto each copy (on by default)
    pub fn preserve_mtime(mut self, enabled: bool) -> Self {
        self.preserve_mtime = enabled;
        self
    }

    /// Run the dated pass, then the other-files pass
    pub fn place(&self, classification: &Classification) -> PlacementSummary {
        let dated = self.place_dated(&classification.index);
        let other = self.place_others(&classification.others);
        PlacementSummary { dated, other }
    }

    /// Copy every record of the index into the date tree or the error bucket
    pub fn place_dated(&self, index: &DateIndex) -> PlacementReport {
        let _span = span!(Level::INFO, "place_dated").entered();
        let total: usize = index.values().map(Vec::len).sum();
        info!(total, "Starting to sort files");
        self.progress.begin("dated", total);

        let mut report = PlacementReport::default();
        for (date, records) in index {
            let mut normal_rank = 0;
            let mut error_rank = 0;
            for record in records {
                let dest = if record.is_error() {
                    error_rank += 1;
                    error_destination(&self.dest_root, date, error_rank, &record.extension)
                } else {
                    normal_rank += 1;
                    dated_destination(&self.dest_root, date, normal_rank, &record.extension)
                };
                let result = self.copy(&record.source, &dest);
                report.record(&record.source, &dest, result);
                self.progress.advance(&record.source);
            }
        }

        self.progress.report();
        report
    }

    /// Copy every undated file into the other-files directory by base name
    pub fn place_others(&self, others: &[PathBuf]) -> PlacementReport {
        let _span = span!(Level::INFO, "place_others").entered();
        info!(total = others.len(), "Starting to copy other files");
        self.progress.begin("other", others.len());

        let mut report = PlacementReport::default();
        for source in others {
            match source.file_name() {
                Some(name) => {
                    let dest = self.other_root.join(name);
                    let result = self.copy(source, &dest);
                    report.record(source, &dest, result);
                }
                None => {
                    error!(?source, "Source has no file name, skipping");
                    report.failed += 1;
                }
            }
            self.progress.advance(source);
        }

        self.progress.report();
        report
    }

    fn copy(&self, source: &Path, dest: &Path) -> Result<u64> {
        let bytes = copy_file(source, dest)?;
        if self.preserve_mtime {
            preserve_modification_time(source, dest);
        }
        Ok(bytes)
    }
}

/// `dest/{Y}/{M}/{D}/{Y}-{M}-{D}-{rank}.{ext}`
pub fn dated_destination(dest_root: &Path, date: &CalendarDate, rank: usize, ext: &str) -> PathBuf {
    dest_root
        .join(date.year.to_string())
        .join(date.month.to_string())
        .join(date.day.to_string())
        .join(ranked_file_name(date, rank, ext))
}

/// `dest/err/{Y}-{M}-{D}-{rank}.{ext}`
pub fn error_destination(dest_root: &Path, date: &CalendarDate, rank: usize, ext: &str) -> PathBuf {
    dest_root.join(ERROR_DIR).join(ranked_file_name(date, rank, ext))
}

fn ranked_file_name(date: &CalendarDate, rank: usize, ext: &str) -> String {
    if ext.is_empty() {
        format!("{}-{}", date, rank)
    } else {
        format!("{}-{}.{}", date, rank, ext)
    }
}

/// Copy a regular file, creating missing parent directories
///
/// Returns the number of bytes copied. A failure while streaming leaves the
/// destination partially written.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let metadata = fs::metadata(source).map_err(|e| Error::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_file() {
        return Err(Error::NotRegularFile {
            path: source.to_path_buf(),
        });
    }

    let src_file = File::open(source).map_err(|e| Error::Open {
        path: source.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let dest_file = File::create(dest).map_err(|e| Error::Create {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    io::copy(&mut reader, &mut writer)
        .and_then(|bytes| writer.flush().map(|()| bytes))
        .map_err(|e| Error::CopyStream {
            src: source.to_path_buf(),
            dst: dest.to_path_buf(),
            source: e,
        })
}

fn preserve_modification_time(source: &Path, dest: &Path) {
    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
        && let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
    {
        debug!(?dest, error = %e, "Could not preserve modification time");
    }
}
