// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::metrics::metrics;
use crate::models::{AppState, FileStatus, Settings};
use camino::Utf8PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The source folder has been set or changed
    SourceFolderChanged {
        folder: Option<Utf8PathBuf>,
    },

    /// A directory scan has started
    ScanStarted,

    /// File buckets have grown during a scan
    FilesUpdated {
        accepted: usize,
        ignored: usize,
    },

    /// A directory scan has finished
    ScanFinished {
        accepted: usize,
        ignored: usize,
    },

    /// A patch run over the accepted files has started
    ApplyStarted {
        total: usize,
    },

    /// A file has begun processing
    FileStarted {
        index: usize,
    },

    /// A file has finished processing
    FileResult {
        index: usize,
        patched: bool,
    },

    /// A patch run has finished
    ApplyFinished {
        patched: usize,
        failed: usize,
    },

    /// Progress has been updated during a patch run
    ProgressUpdated {
        current: usize,
        total: usize,
    },

    /// Current operation description has changed
    OperationChanged {
        operation: String,
    },

    /// Target shader values have changed
    TargetsChanged {
        glossiness: f32,
        specular_strength: f32,
    },

    /// One accepted file has been removed from the batch
    FileRemoved {
        index: usize,
        accepted: usize,
    },

    /// Both file buckets have been cleared
    FilesCleared,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state without cloning
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::models::AppState`]: The underlying state structure
/// - [`StateChange`]: Event types emitted on state mutations
/// - [`crate::config::SettingsManager`]: Loads settings into state
/// - [`crate::ui::controller::GuiController`]: Primary consumer of state events
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    /// Multiple subscribers can listen for state changes
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    ///
    /// This clones the entire state, so it's safe to use without holding locks.
    /// For checking individual fields, prefer `read()` with a closure.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let accepted = state_manager.read(|state| state.accepted_files.len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        // Apply the update
        update_fn(&mut state);

        // Detect changes and emit events
        let changes = self.detect_changes(&old_state, &state);

        metrics().record_state_update();
        for change in &changes {
            self.emit(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Send an event to all subscribers.
    fn emit(&self, change: StateChange) {
        metrics().record_state_broadcast();
        // Ignore send errors - it's OK if no one is listening
        let _ = self.state_tx.send(change);
    }

    /// Detect what changed between two states and generate events
    ///
    /// This is called internally by `update()` to determine which events to emit.
    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.source_folder != new.source_folder {
            changes.push(StateChange::SourceFolderChanged {
                folder: new.source_folder.clone(),
            });
        }

        // Scan state changes
        if old.is_scanning != new.is_scanning {
            if new.is_scanning {
                changes.push(StateChange::ScanStarted);
            } else {
                changes.push(StateChange::ScanFinished {
                    accepted: new.accepted_files.len(),
                    ignored: new.ignored_files.len(),
                });
            }
        } else if new.accepted_files.len() > old.accepted_files.len()
            || new.ignored_files.len() > old.ignored_files.len()
        {
            // Bucket growth mid-scan. Shrinking is emitted explicitly as
            // FilesCleared or FileRemoved, so only growing lists end up here.
            changes.push(StateChange::FilesUpdated {
                accepted: new.accepted_files.len(),
                ignored: new.ignored_files.len(),
            });
        }

        // Apply state changes
        if old.is_applying != new.is_applying {
            if new.is_applying {
                changes.push(StateChange::ApplyStarted {
                    total: new.total_files,
                });
            } else {
                changes.push(StateChange::ApplyFinished {
                    patched: new.patched_count,
                    failed: new.failed_count,
                });
            }
        }

        // Progress changes
        if old.progress != new.progress || old.total_files != new.total_files {
            changes.push(StateChange::ProgressUpdated {
                current: new.progress,
                total: new.total_files,
            });
        }

        // Operation changes
        if old.current_operation != new.current_operation {
            changes.push(StateChange::OperationChanged {
                operation: new.current_operation.clone(),
            });
        }

        // Target shader value changes
        if old.glossiness != new.glossiness || old.specular_strength != new.specular_strength {
            changes.push(StateChange::TargetsChanged {
                glossiness: new.glossiness,
                specular_strength: new.specular_strength,
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Set the source folder to scan
    pub fn set_source_folder(&self, folder: Option<Utf8PathBuf>) -> Vec<StateChange> {
        self.update(|state| {
            state.source_folder = folder;
        })
    }

    /// Set the target shader values
    pub fn set_targets(&self, glossiness: f32, specular_strength: f32) -> Vec<StateChange> {
        self.update(|state| {
            state.glossiness = glossiness;
            state.specular_strength = specular_strength;
        })
    }

    /// Start a directory scan
    pub fn begin_scan(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_scanning = true;
            state.current_operation = "Scanning for .nif files...".to_string();
        })
    }

    /// Record one scanned file in the matching bucket
    ///
    /// Returns true if the file was new, false if it was already known.
    pub fn add_scanned_file(&self, path: Utf8PathBuf, accepted: bool) -> bool {
        let mut added = false;
        self.update(|state| {
            added = if accepted {
                state.add_accepted(path)
            } else {
                state.add_ignored(path)
            };
        });
        added
    }

    /// Finish the directory scan
    pub fn finish_scan(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_scanning = false;
            state.current_operation = "Ready".to_string();
        })
    }

    /// Start a patch run over all accepted files
    pub fn begin_apply(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.reset_apply_state();
            state.is_applying = true;
            state.total_files = state.accepted_files.len();
            state.file_status.fill(FileStatus::Pending);
            state.current_operation = "Applying shader parameters...".to_string();
        })
    }

    /// Mark a file as currently being processed
    pub fn mark_file_processing(&self, index: usize) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            if let Some(slot) = state.file_status.get_mut(index) {
                *slot = FileStatus::Processing;
            }
        });

        let event = StateChange::FileStarted { index };
        self.emit(event.clone());
        changes.push(event);

        changes
    }

    /// Record the outcome of one file's patch job
    pub fn record_file_result(&self, index: usize, patched: bool) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.record_result(index, patched);
        });

        let event = StateChange::FileResult { index, patched };
        self.emit(event.clone());
        changes.push(event);

        changes
    }

    /// Finish the patch run
    pub fn finish_apply(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_applying = false;
            state.current_operation = "Ready".to_string();
        })
    }

    /// Remove one file from the accepted list
    ///
    /// Returns the removed path, or None when the index is out of range or a
    /// scan/patch run is still using the list.
    pub fn remove_accepted(&self, index: usize) -> Option<Utf8PathBuf> {
        let mut removed = None;
        self.update(|state| {
            removed = state.remove_accepted(index);
        });

        if removed.is_some() {
            self.emit(StateChange::FileRemoved {
                index,
                accepted: self.read(|s| s.accepted_files.len()),
            });
        }
        removed
    }

    /// Clear both file buckets
    pub fn clear_files(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.clear_files();
        });

        let event = StateChange::FilesCleared;
        self.emit(event.clone());
        changes.push(event);

        changes
    }

    /// Load application state from persisted settings
    ///
    /// This populates AppState fields from the settings file: the remembered
    /// source folder, the keyword list, and the target shader values.
    pub fn load_from_settings(&self, settings: &Settings) -> Vec<StateChange> {
        self.update(|state| {
            if !settings.source_folder.is_empty() {
                state.source_folder = Some(Utf8PathBuf::from(&settings.source_folder));
            }
            state.keywords = settings.keywords.clone();
            state.glossiness = settings.glossiness;
            state.specular_strength = settings.specular_strength;
            state.soft_limit = settings.soft_limit;

            tracing::info!(
                "Loaded settings: source_folder={:?}, keywords={:?}, glossiness={}, specular_strength={}",
                state.source_folder,
                state.keywords,
                state.glossiness,
                state.specular_strength
            );
        })
    }

    /// Get an Arc reference to the state for use in worker threads
    ///
    /// Use this when you need to share state across threads but want
    /// to minimize cloning. Remember to use read/write locks appropriately.
    pub fn state_arc(&self) -> Arc<RwLock<AppState>> {
        Arc::clone(&self.state)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
