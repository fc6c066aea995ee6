// Services module
//
// Mesh file parsing and patching plus the recursive directory scanner.
// Everything here is synchronous and blocking; the UI layer runs it through
// spawn_blocking so the event loop stays responsive.

pub mod nif;
pub mod scan;

pub use nif::{NifError, NifHeader, PatchOutcome, inspect, patch_file};
pub use scan::{ScanSummary, ScanVerdict, scan_folder};
