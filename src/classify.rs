//! Recursive classification of source files by resolved date
//!
//! Every non-directory entry under the source root ends up in exactly one of:
//! - the [`DateIndex`], as a normal or degraded [`FileRecord`]
//! - the `others` list, when no date could be obtained for it

use crate::config::Config;
use crate::error::{Error, Result};
use crate::time::{CalendarDate, TimeSource, resolve};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// One dated source file
#[derive(Debug)]
pub struct FileRecord {
    /// Source file path
    pub source: PathBuf,
    /// Extension without the leading dot, case preserved (empty if none)
    pub extension: String,
    /// Resolved date; a modification-time fallback when `error` is set
    pub date: CalendarDate,
    /// Where `date` came from
    pub time_source: TimeSource,
    /// Metadata decode failure, routes the record to the error bucket
    pub error: Option<Error>,
}

impl FileRecord {
    /// Whether the record belongs in the error bucket
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Records grouped by date, each group in walk order
pub type DateIndex = BTreeMap<CalendarDate, Vec<FileRecord>>;

/// Result of classifying a source tree
#[derive(Debug, Default)]
pub struct Classification {
    pub index: DateIndex,
    /// Files for which no date could be resolved, in walk order
    pub others: Vec<PathBuf>,
}

impl Classification {
    /// Number of dated records (normal and error)
    pub fn dated_count(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    /// Number of dated records bound for the error bucket
    pub fn error_count(&self) -> usize {
        self.index
            .values()
            .flatten()
            .filter(|record| record.is_error())
            .count()
    }

    pub fn other_count(&self) -> usize {
        self.others.len()
    }

    fn insert(&mut self, record: FileRecord) {
        self.index.entry(record.date).or_default().push(record);
    }
}

/// Walk `root` recursively and classify every file by date
///
/// Fails if the root or any subdirectory cannot be listed. Entries are
/// visited in file-name order so positional naming is stable across runs.
pub fn classify(root: &Path, config: &Config) -> Result<Classification> {
    let _span = span!(Level::INFO, "classify", root = %root.display()).entered();
    let mut classification = Classification::default();

    fs::read_dir(root).map_err(|source| Error::ListDir {
        path: root.to_path_buf(),
        source,
    })?;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_listing_failure(e.path()) => return Err(e.into()),
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "Cannot read entry, skipping");
                continue;
            }
        };
        let path = entry.path();

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(?path, error = %e, "Cannot read entry metadata, skipping");
                continue;
            }
        };
        if metadata.is_dir() {
            continue;
        }

        match resolve(path, config) {
            Ok(resolved) => {
                if let Some(ref e) = resolved.error {
                    warn!(?path, date = %resolved.date, error = %e, "Metadata unreadable, filing under error bucket");
                } else {
                    debug!(?path, date = %resolved.date, source = ?resolved.source, "Resolved date");
                }
                classification.insert(FileRecord {
                    source: path.to_path_buf(),
                    extension: extension_of(path),
                    date: resolved.date,
                    time_source: resolved.source,
                    error: resolved.error,
                });
            }
            Err(e) if e.is_open_failure() => {
                warn!(?path, error = %e, "Cannot open file, filing under other files");
                classification.others.push(path.to_path_buf());
            }
            Err(e) => {
                warn!(?path, error = %e, "No date obtainable, filing under other files");
                classification.others.push(path.to_path_buf());
            }
        }
    }

    info!(
        dated = classification.dated_count(),
        errors = classification.error_count(),
        others = classification.other_count(),
        "Reading files completed"
    );

    Ok(classification)
}

/// A walk error is fatal only when it comes from listing a directory
fn is_listing_failure(path: Option<&Path>) -> bool {
    path.is_some_and(Path::is_dir)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::tests::{jpeg_with_date, set_mtime};
    use tempfile::tempdir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b/photo.JPG")), "JPG");
        assert_eq!(extension_of(Path::new("a/archive.tar.gz")), "gz");
        assert_eq!(extension_of(Path::new("a/README")), "");
    }

    #[test]
    fn test_classify_nested_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2021/trip")).unwrap();

        let photo = root.join("2021/trip/photo.jpg");
        fs::write(&photo, jpeg_with_date("2021:06:15 09:00:00")).unwrap();
        let note = root.join("note.txt");
        fs::write(&note, "hello").unwrap();
        set_mtime(&note, 2020, 1, 2);
        let scan = root.join("2021/scan.png");
        fs::write(&scan, b"not really a png").unwrap();
        set_mtime(&scan, 2020, 1, 2);

        let result = classify(root, &Config::default()).unwrap();
        assert_eq!(result.dated_count(), 3);
        assert_eq!(result.error_count(), 1);
        assert!(result.others.is_empty());

        let june = &result.index[&CalendarDate::new(2021, 6, 15)];
        assert_eq!(june.len(), 1);
        assert_eq!(june[0].source, photo);
        assert_eq!(june[0].extension, "jpg");
        assert_eq!(june[0].time_source, TimeSource::Exif);

        // Walk order is file-name order: "2021/scan.png" before "note.txt"
        let january = &result.index[&CalendarDate::new(2020, 1, 2)];
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].source, scan);
        assert!(january[0].is_error());
        assert_eq!(january[1].source, note);
        assert!(!january[1].is_error());
    }

    #[test]
    fn test_index_keys_match_record_dates() {
        let dir = tempdir().unwrap();
        for (name, day) in [("a.txt", 1), ("b.txt", 2), ("c.txt", 1)] {
            let path = dir.path().join(name);
            fs::write(&path, name).unwrap();
            set_mtime(&path, 2022, 5, day);
        }

        let result = classify(dir.path(), &Config::default()).unwrap();
        assert_eq!(result.index.len(), 2);
        for (date, records) in &result.index {
            assert!(records.iter().all(|r| r.date == *date));
        }
        let first = &result.index[&CalendarDate::new(2022, 5, 1)];
        assert_eq!(first[0].source, dir.path().join("a.txt"));
        assert_eq!(first[1].source, dir.path().join("c.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unopenable_file_goes_to_others() {
        let dir = tempdir().unwrap();
        let dangling = dir.path().join("dangling.jpg");
        std::os::unix::fs::symlink(dir.path().join("nowhere.jpg"), &dangling).unwrap();
        fs::write(dir.path().join("ok.txt"), "ok").unwrap();

        let result = classify(dir.path(), &Config::default()).unwrap();
        assert_eq!(result.others, vec![dangling]);
        assert_eq!(result.dated_count(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let err = classify(&dir.path().join("absent"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::ListDir { .. }));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = tempdir().unwrap();
        let photo = dir.path().join("photo.jpg");
        fs::write(&photo, jpeg_with_date("2021:06:15 09:00:00")).unwrap();

        let err = classify(&photo, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::ListDir { ref path, .. } if *path == photo));
    }

    #[test]
    fn test_is_listing_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("vanishing.txt");
        fs::write(&file, "x").unwrap();

        assert!(is_listing_failure(Some(dir.path())));
        assert!(!is_listing_failure(Some(&file)));
        assert!(!is_listing_failure(Some(&dir.path().join("already-gone.txt"))));
        assert!(!is_listing_failure(None));
    }

    #[test]
    fn test_empty_root() {
        let dir = tempdir().unwrap();
        let result = classify(dir.path(), &Config::default()).unwrap();
        assert_eq!(result.dated_count(), 0);
        assert_eq!(result.other_count(), 0);
    }
}
