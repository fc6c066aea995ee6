//! Data models for the NifBatch application.
//!
//! - [`AppState`]: the central state container holding the two file buckets,
//!   runtime flags, progress counters and the shader parameter targets
//! - [`Settings`]: typed view of the `nifbatch.ini` settings file
//! - [`FileStatus`]: per-file lifecycle used for UI color coding
//! - [`MAX_CONCURRENT_NIF_TASKS`]: bound on apply fan-out
//!
//! # Architecture Note
//!
//! `AppState` is wrapped in `Arc<RwLock<>>` by
//! [`StateManager`](crate::state::StateManager); all mutations go through the
//! manager's `update()` so change events reach the UI.

pub mod app_state;
pub mod settings;

pub use app_state::{AppState, FileStatus, MAX_CONCURRENT_NIF_TASKS};
pub use settings::{Settings, parse_keywords};
