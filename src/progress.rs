//! Shared progress counters and the background reporter thread

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// Snapshot of the placement progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// Name of the running pass
    pub phase: &'static str,
    /// Files handled so far in this pass
    pub processed: usize,
    /// Files to handle in this pass
    pub total: usize,
    /// File most recently handled
    pub current: Option<PathBuf>,
}

/// Lock-guarded progress counters shared with the reporter
#[derive(Debug, Clone, Default)]
pub struct Progress {
    inner: Arc<Mutex<ProgressState>>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass, resetting the counters
    pub fn begin(&self, phase: &'static str, total: usize) {
        *self.lock() = ProgressState {
            phase,
            processed: 0,
            total,
            current: None,
        };
    }

    /// Record that `path` has been handled
    pub fn advance(&self, path: &Path) {
        let mut state = self.lock();
        state.processed += 1;
        state.current = Some(path.to_path_buf());
    }

    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }

    /// Emit one progress line
    pub fn report(&self) {
        let state = self.snapshot();
        let current = state
            .current
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        info!(
            phase = state.phase,
            "Processing: {} / {} | Current: {}",
            state.processed,
            state.total,
            current
        );
    }

    // Poisoning is ignored, every write leaves the state consistent
    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic progress logger running on its own thread
///
/// The thread lives until the process exits; callers emit the final line
/// themselves with [`Progress::report`].
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn spawn(progress: Progress, interval: Duration) -> JoinHandle<()> {
        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                progress.report();
            }
        })
    }
}
