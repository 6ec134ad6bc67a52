//! Sorting pipeline
//!
//! Runs the two stages in order:
//! - classification of the source tree by resolved date
//! - placement of the classified files, with a background progress reporter

use crate::classify::classify;
use crate::config::Config;
use crate::error::Result;
use crate::place::{PlacementSummary, Placer};
use crate::progress::{Progress, ProgressReporter};
use tracing::{Level, info, span};

/// Totals of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSummary {
    /// Dated records found (normal and error bucket)
    pub dated: usize,
    /// Dated records bound for the error bucket
    pub errors: usize,
    /// Files that could not be dated
    pub others: usize,
    pub placement: PlacementSummary,
}

impl SortSummary {
    pub fn summary(&self) -> String {
        format!(
            "Dated: {} (errors: {}), Others: {}, Copied: {}, Failed: {}",
            self.dated,
            self.errors,
            self.others,
            self.placement.dated.copied + self.placement.other.copied,
            self.placement.dated.failed + self.placement.other.failed
        )
    }
}

/// Runs the whole sort for one configuration
pub struct Sorter {
    config: Config,
    progress: Progress,
}

impl Sorter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            progress: Progress::new(),
        }
    }

    /// Classify and place every file, reporting progress periodically
    ///
    /// Only a failure to walk the source tree is returned as an error;
    /// per-file failures are logged and counted.
    pub fn run(&self) -> Result<SortSummary> {
        self.execute(true)
    }

    /// Same as [`Sorter::run`] without the background reporter
    pub fn sort(&self) -> Result<SortSummary> {
        self.execute(false)
    }

    fn execute(&self, periodic_reports: bool) -> Result<SortSummary> {
        let _span = span!(Level::INFO, "sort_run").entered();

        info!(source = %self.config.source_dir.display(), "Reading files");
        let classification = classify(&self.config.source_dir, &self.config)?;

        if periodic_reports {
            let _reporter =
                ProgressReporter::spawn(self.progress.clone(), self.config.progress_interval());
        }

        let placer = Placer::new(
            &self.config.dest_dir,
            &self.config.other_dir,
            self.progress.clone(),
        )
        .preserve_mtime(self.config.preserve_mtime);
        let placement = placer.place(&classification);

        let summary = SortSummary {
            dated: classification.dated_count(),
            errors: classification.error_count(),
            others: classification.other_count(),
            placement,
        };
        info!("Sorting finished. {}", summary.summary());
        Ok(summary)
    }
}
