// Directory scanning service
//
// Walks a source folder recursively, classifies every .nif file through the
// keyword filter, and reports each file to a callback so the caller can feed
// state updates while the walk is still running.

use crate::metrics::metrics;
use crate::services::nif;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Where a scanned file ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanVerdict {
    /// Root node and keyword check passed; file will be patched on apply.
    Accepted,

    /// Readable mesh file with no matching node name.
    Ignored,

    /// File could not be read or parsed. The message is the display form
    /// of the underlying [`nif::NifError`].
    Failed(String),
}

/// Totals for one scan pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub accepted: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Files skipped because they were already in a bucket.
    pub skipped_known: usize,
}

/// Recursively scan `root` for .nif files and classify each one.
///
/// `already_known` filters out files from earlier scans so that re-scanning
/// an overlapping folder only reports new ones. `on_file` is invoked for
/// every new file with its verdict; unreadable files count as ignored, the
/// way a missing keyword does, but carry the error for logging and display.
pub fn scan_folder<S, F>(
    root: &Utf8Path,
    keywords: &[String],
    mut already_known: S,
    mut on_file: F,
) -> ScanSummary
where
    S: FnMut(&Utf8Path) -> bool,
    F: FnMut(Utf8PathBuf, ScanVerdict),
{
    let mut summary = ScanSummary::default();

    for entry in WalkDir::new(root.as_std_path()) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Scan: unreadable directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Scan: skipping non-UTF-8 path: {}", path.display());
                continue;
            }
        };
        if !has_nif_extension(&path) {
            continue;
        }

        metrics().record_file_scanned();

        if already_known(&path) {
            summary.skipped_known += 1;
            continue;
        }

        let verdict = match nif::inspect(&path, keywords) {
            Ok(true) => {
                metrics().record_file_accepted();
                summary.accepted += 1;
                ScanVerdict::Accepted
            }
            Ok(false) => {
                metrics().record_file_ignored();
                summary.ignored += 1;
                ScanVerdict::Ignored
            }
            Err(e) => {
                tracing::warn!("Scan: {}: {}", path, e);
                metrics().record_file_ignored();
                summary.failed += 1;
                ScanVerdict::Failed(e.to_string())
            }
        };

        on_file(path, verdict);
    }

    tracing::info!(
        "Scan of {} finished: {} accepted, {} ignored, {} unreadable, {} already known",
        root,
        summary.accepted,
        summary.ignored,
        summary.failed,
        summary.skipped_known
    );

    summary
}

fn has_nif_extension(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nif"))
}
