use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;

/// Maximum number of concurrent patch tasks during an apply run.
///
/// Each task owns exactly one file, so unlike external-tool runners there is no
/// file-locking constraint that would force serial execution. The bound exists
/// only to keep disk pressure sane; it matches the tokio worker thread count.
///
/// Enforced in the apply workflow (see [`crate::ui::GuiController`]) using a
/// `tokio::sync::Semaphore`.
pub const MAX_CONCURRENT_NIF_TASKS: usize = 4;

/// Per-file lifecycle inside the accepted list.
///
/// Drives the UI color coding: processing is shown blue, patched green,
/// failed red.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Processing,
    Patched,
    Failed,
}

/// Single source of truth for all application state.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`crate::state::StateManager`]. Never access `AppState` directly from the
/// UI or worker layers; use the manager's `read()` / `update()` methods so
/// change events are emitted consistently.
///
/// # File bookkeeping
///
/// The accepted and ignored lists are ordered `Vec`s mirroring the two UI list
/// widgets, each shadowed by a `HashSet` for O(1) membership checks during
/// scans (re-scanning a folder must not duplicate entries). `file_status` runs
/// parallel to `accepted_files` and records each file's apply outcome.
#[derive(Clone, Debug)]
pub struct AppState {
    // Configuration
    pub source_folder: Option<Utf8PathBuf>,
    pub keywords: Vec<String>,
    pub glossiness: f32,
    pub specular_strength: f32,
    pub soft_limit: usize,

    // Runtime state
    pub is_scanning: bool,
    pub is_applying: bool,
    pub current_operation: String,

    // File buckets (vec mirrors the list widget, set gives O(1) lookup)
    pub accepted_files: Vec<Utf8PathBuf>,
    pub accepted_set: HashSet<Utf8PathBuf>,
    pub ignored_files: Vec<Utf8PathBuf>,
    pub ignored_set: HashSet<Utf8PathBuf>,
    pub file_status: Vec<FileStatus>,

    // Apply progress
    pub progress: usize,
    pub total_files: usize,
    pub patched_count: usize,
    pub failed_count: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source_folder: None,
            keywords: Vec::new(),
            glossiness: 450.0,
            specular_strength: 3.5,
            soft_limit: 100,

            is_scanning: false,
            is_applying: false,
            current_operation: String::new(),

            accepted_files: Vec::new(),
            accepted_set: HashSet::new(),
            ignored_files: Vec::new(),
            ignored_set: HashSet::new(),
            file_status: Vec::new(),

            progress: 0,
            total_files: 0,
            patched_count: 0,
            failed_count: 0,
        }
    }
}

impl AppState {
    /// True if a path already sits in either bucket.
    ///
    /// Used by the scanner so that re-scanning a folder (or scanning an
    /// overlapping folder) only adds files not seen before.
    pub fn is_known(&self, path: &Utf8Path) -> bool {
        self.accepted_set.contains(path) || self.ignored_set.contains(path)
    }

    /// Add a file to the accepted bucket. Returns false if it was already known.
    pub fn add_accepted(&mut self, path: Utf8PathBuf) -> bool {
        if self.is_known(&path) {
            return false;
        }
        self.accepted_set.insert(path.clone());
        self.accepted_files.push(path);
        self.file_status.push(FileStatus::Pending);
        true
    }

    /// Add a file to the ignored bucket. Returns false if it was already known.
    pub fn add_ignored(&mut self, path: Utf8PathBuf) -> bool {
        if self.is_known(&path) {
            return false;
        }
        self.ignored_set.insert(path.clone());
        self.ignored_files.push(path);
        true
    }

    /// Remove the accepted file at `index` so the next patch run skips it.
    ///
    /// Refused while a scan or patch run is in flight: workers hold indices
    /// into the list. A removed file is no longer known, so a re-scan will
    /// pick it up again.
    pub fn remove_accepted(&mut self, index: usize) -> Option<Utf8PathBuf> {
        if self.is_scanning || self.is_applying || index >= self.accepted_files.len() {
            return None;
        }
        let path = self.accepted_files.remove(index);
        self.accepted_set.remove(&path);
        self.file_status.remove(index);
        Some(path)
    }

    /// Drop both buckets and all apply progress.
    pub fn clear_files(&mut self) {
        self.accepted_files.clear();
        self.accepted_set.clear();
        self.ignored_files.clear();
        self.ignored_set.clear();
        self.file_status.clear();
        self.reset_apply_state();
    }

    /// Reset the per-run apply counters.
    pub fn reset_apply_state(&mut self) {
        self.is_applying = false;
        self.progress = 0;
        self.total_files = 0;
        self.patched_count = 0;
        self.failed_count = 0;
        self.current_operation.clear();
    }

    /// Record the outcome of one file's patch job.
    ///
    /// `patched` mirrors the per-file success boolean: true means the shader
    /// parameters were rewritten, false covers both read/write errors and
    /// files with no matching node.
    pub fn record_result(&mut self, index: usize, patched: bool) {
        if let Some(slot) = self.file_status.get_mut(index) {
            *slot = if patched {
                FileStatus::Patched
            } else {
                FileStatus::Failed
            };
        }
        if patched {
            self.patched_count += 1;
        } else {
            self.failed_count += 1;
        }
        self.progress += 1;
    }

    /// Get current apply statistics as (patched, failed, done, total).
    pub fn apply_stats(&self) -> (usize, usize, usize, usize) {
        (
            self.patched_count,
            self.failed_count,
            self.progress,
            self.total_files,
        )
    }
}
