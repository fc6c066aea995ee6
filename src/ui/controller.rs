// GUI Controller - Bridges Slint UI with Rust State Management
//
// This module contains the GuiController which coordinates between:
// - Slint UI (MainWindow)
// - StateManager (application state)
// - The scan and patch services
// - EventLoopBridge (async/GUI coordination)
//
// It handles:
// - Setting up UI callbacks → async tasks
// - Subscribing to state changes → UI updates
// - The folder browser dialog
// - Scan and apply orchestration

use crate::config::SettingsManager;
use crate::metrics::metrics;
use crate::models::{FileStatus, MAX_CONCURRENT_NIF_TASKS};
use crate::services::{nif, scan};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{Model, ModelRc, SharedString, VecModel};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, watch};

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires up the Slint UI with application state and logic
///
/// This is the main coordinator for the GUI layer. It:
/// - Creates and manages the EventLoopBridge for tokio/Slint coordination
/// - Sets up Slint callbacks to trigger async operations
/// - Subscribes to StateManager events and updates UI accordingly
/// - Shows the native folder picker using the `rfd` crate
///
/// # Example
/// ```ignore
/// let state_manager = Arc::new(StateManager::new());
/// let settings_manager = Arc::new(SettingsManager::new("nifbatch.ini")?);
/// let runtime = tokio::runtime::Runtime::new()?;
///
/// let controller = GuiController::new(
///     state_manager,
///     settings_manager,
///     runtime.handle().clone()
/// )?;
/// controller.run()?;  // Blocks until window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Event loop bridge for coordinating between tokio and Slint
    _bridge: EventLoopBridge<MainWindow>,

    /// Shared state manager
    state_manager: Arc<StateManager>,

    /// Cancellation sender for graceful shutdown
    /// Send `true` to request cancellation of an ongoing patch run
    cancel_tx: watch::Sender<bool>,
}

impl GuiController {
    /// Create a new GUI controller
    pub fn new(
        state_manager: Arc<StateManager>,
        settings_manager: Arc<SettingsManager>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let bridge = EventLoopBridge::new(&ui, tokio_handle);

        // Cancellation channel for graceful shutdown
        let (cancel_tx, cancel_rx) = watch::channel(false);

        // Initialize UI with current state
        Self::sync_ui_with_state(&ui, &state_manager);

        // Set up Slint callbacks with cancellation receiver
        Self::setup_callbacks(&ui, &bridge, &state_manager, &settings_manager, cancel_rx);

        // Subscribe to state changes and update UI
        Self::setup_state_subscription(&bridge, &state_manager);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            state_manager,
            cancel_tx,
        })
    }

    /// Run the GUI (blocks until window is closed)
    ///
    /// If the window is closed while a patch run is in flight, cancellation
    /// is requested before returning so queued tasks stop quickly.
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        if self.state_manager.read(|s| s.is_applying) {
            tracing::warn!("Window closed during patch run - cancelling...");
            self.request_cancel();
        }

        result
    }

    /// Request graceful cancellation of an ongoing patch run
    ///
    /// Queued files stop immediately; the files currently being written
    /// finish first so no mesh is left half-patched.
    pub fn request_cancel(&self) {
        tracing::info!("Cancellation requested via watch channel");
        let _ = self.cancel_tx.send(true);
        self.state_manager.finish_apply();
    }

    /// Synchronize UI with current state
    ///
    /// This is called once at startup to initialize the UI with the current state.
    fn sync_ui_with_state(ui: &MainWindow, state_manager: &StateManager) {
        let state = state_manager.snapshot();

        ui.set_source_folder(
            state
                .source_folder
                .as_ref()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default()
                .into(),
        );

        ui.set_glossiness_text(format_float(state.glossiness).into());
        ui.set_specular_strength_text(format_float(state.specular_strength).into());

        ui.set_is_busy(state.is_scanning || state.is_applying);
        ui.set_progress_current(state.progress as i32);
        ui.set_progress_total(state.total_files as i32);
        ui.set_accepted_count(state.accepted_files.len() as i32);
        ui.set_ignored_count(state.ignored_files.len() as i32);

        ui.set_accepted_files(ModelRc::new(VecModel::from(
            state
                .accepted_files
                .iter()
                .zip(&state.file_status)
                .map(|(path, status)| FileEntry {
                    path: path.as_str().into(),
                    status: status_code(*status),
                })
                .collect::<Vec<_>>(),
        )));
        ui.set_ignored_files(ModelRc::new(VecModel::from(
            state
                .ignored_files
                .iter()
                .map(|p| SharedString::from(p.as_str()))
                .collect::<Vec<_>>(),
        )));

        tracing::debug!("UI synchronized with initial state");
    }

    /// Set up Slint UI callbacks
    ///
    /// This connects Slint UI events (button clicks, etc.) to Rust logic.
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        settings_manager: &Arc<SettingsManager>,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let settings = Arc::clone(settings_manager);

        // Scan folder callback: pick a directory, then walk it off the UI thread
        ui.on_scan_folder(move || {
            tracing::info!("Scan folder button clicked");

            let start_dir = state.read(|s| s.source_folder.clone());
            let Some(folder) = Self::show_folder_picker(start_dir.as_deref()) else {
                tracing::debug!("Folder picker cancelled");
                return;
            };

            tracing::info!("Source folder selected: {}", folder);
            state.set_source_folder(Some(folder.clone()));
            if let Err(e) = settings.update(|s| s.source_folder = folder.as_str().to_string()) {
                tracing::error!("Failed to save source folder: {}", e);
            }

            let bridge = bridge_handle.clone();
            let bridge_clone = bridge.clone();
            let state = Arc::clone(&state);

            bridge.spawn_async(move || async move {
                Self::run_scan_workflow(state, folder, bridge_clone).await;
            });
        });

        let state = Arc::clone(state_manager);

        // Clear files callback
        ui.on_clear_files(move || {
            tracing::info!("Clear files button clicked");
            state.clear_files();
        });

        let state = Arc::clone(state_manager);
        let ui_weak = ui.as_weak();

        // Delete key on the accepted list: drop the selected file from the batch
        ui.on_remove_selected(move || {
            let Some(ui) = ui_weak.upgrade() else {
                return;
            };
            let index = ui.get_selected_accepted();
            if index < 0 {
                return;
            }
            match state.remove_accepted(index as usize) {
                Some(path) => tracing::info!("Removed from batch: {}", path),
                None => tracing::warn!("Remove ignored: index {} not removable", index),
            }
        });

        let state = Arc::clone(state_manager);
        let settings = Arc::clone(settings_manager);
        let ui_weak = ui.as_weak();

        // Glossiness edited
        ui.on_glossiness_edited(move |text| {
            match text.trim().parse::<f32>() {
                Ok(value) => {
                    let specular = state.read(|s| s.specular_strength);
                    state.set_targets(value, specular);
                    if let Err(e) = settings.update(|s| s.glossiness = value) {
                        tracing::error!("Failed to save glossiness: {}", e);
                    }
                }
                Err(_) => {
                    tracing::warn!("Rejected glossiness input: {:?}", text);
                    let current = state.read(|s| s.glossiness);
                    if let Some(ui) = ui_weak.upgrade() {
                        ui.set_glossiness_text(format_float(current).into());
                    }
                    Self::show_error_dialog(
                        &ui_weak,
                        "Invalid Value",
                        format!("\"{}\" is not a valid glossiness value.", text),
                    );
                }
            }
        });

        let state = Arc::clone(state_manager);
        let settings = Arc::clone(settings_manager);
        let ui_weak = ui.as_weak();

        // Specular strength edited
        ui.on_specular_strength_edited(move |text| {
            match text.trim().parse::<f32>() {
                Ok(value) => {
                    let glossiness = state.read(|s| s.glossiness);
                    state.set_targets(glossiness, value);
                    if let Err(e) = settings.update(|s| s.specular_strength = value) {
                        tracing::error!("Failed to save specular strength: {}", e);
                    }
                }
                Err(_) => {
                    tracing::warn!("Rejected specular strength input: {:?}", text);
                    let current = state.read(|s| s.specular_strength);
                    if let Some(ui) = ui_weak.upgrade() {
                        ui.set_specular_strength_text(format_float(current).into());
                    }
                    Self::show_error_dialog(
                        &ui_weak,
                        "Invalid Value",
                        format!("\"{}\" is not a valid specular strength value.", text),
                    );
                }
            }
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let cancel_rx_clone = cancel_rx.clone();
        let ui_weak = ui.as_weak();

        // Apply callback: confirm past the soft limit, then fan out patch jobs
        ui.on_apply_parameters(move || {
            tracing::info!("Apply button clicked");

            let (accepted, soft_limit, is_busy) = state.read(|s| {
                (
                    s.accepted_files.len(),
                    s.soft_limit,
                    s.is_scanning || s.is_applying,
                )
            });

            if is_busy {
                tracing::warn!("Apply ignored: an operation is already running");
                return;
            }

            if accepted == 0 {
                Self::show_message_dialog(
                    &ui_weak,
                    "Nothing to Apply",
                    "No matching files loaded. Scan a folder first.",
                );
                return;
            }

            if over_soft_limit(accepted, soft_limit) {
                tracing::info!(
                    "Accepted file count {} reaches soft limit {} - asking for confirmation",
                    accepted,
                    soft_limit
                );
                if let Some(ui) = ui_weak.upgrade() {
                    ui.set_soft_limit_message(
                        format!(
                            "You are about to modify {} files, which reaches the \
                             configured limit of {}. Continue?",
                            accepted, soft_limit
                        )
                        .into(),
                    );
                    ui.set_show_soft_limit_warning(true);
                }
                return;
            }

            Self::start_apply(&bridge_handle, &state, cancel_rx_clone.clone());
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let cancel_rx_clone = cancel_rx.clone();
        let ui_weak = ui.as_weak();

        // User confirmed the soft limit warning
        ui.on_soft_limit_confirmed(move || {
            tracing::info!("Soft limit warning confirmed - starting patch run");
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_soft_limit_warning(false);
            }
            Self::start_apply(&bridge_handle, &state, cancel_rx_clone.clone());
        });

        let ui_weak = ui.as_weak();

        // User cancelled the soft limit warning
        ui.on_soft_limit_cancelled(move || {
            tracing::info!("Soft limit warning cancelled");
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_soft_limit_warning(false);
            }
        });

        let ui_weak = ui.as_weak();

        // Message dialog dismissed
        ui.on_message_dialog_dismissed(move || {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_message_dialog(false);
            }
        });

        let ui_weak = ui.as_weak();

        // Error dialog dismissed
        ui.on_error_dialog_dismissed(move || {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_show_error_dialog(false);
            }
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Spawn the apply workflow on the tokio runtime
    fn start_apply(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state: &Arc<StateManager>,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let bridge_clone = bridge.clone();
        let state = Arc::clone(state);
        bridge.spawn_async(move || async move {
            Self::run_apply_workflow(state, bridge_clone, cancel_rx).await;
        });
    }

    /// Subscribe to state changes and update UI accordingly
    ///
    /// This spawns a background thread that listens for state change events
    /// and updates the Slint UI via the EventLoopBridge.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
    ) {
        let bridge_handle = bridge.clone_handle();
        let state_manager_clone = Arc::clone(state_manager);
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);
                        Self::apply_state_change(&bridge_handle, &state_manager_clone, change);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                        // Recoverable; keep receiving
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }

    /// Map one state change event onto the UI
    fn apply_state_change(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state_manager: &Arc<StateManager>,
        change: StateChange,
    ) {
        match change {
            StateChange::SourceFolderChanged { folder } => {
                bridge.update_ui(move |ui| {
                    ui.set_source_folder(
                        folder
                            .as_ref()
                            .map(|p| p.as_str().to_string())
                            .unwrap_or_default()
                            .into(),
                    );
                });
            }

            StateChange::ScanStarted => {
                bridge.update_ui(|ui| {
                    ui.set_is_busy(true);
                    ui.set_progress_indeterminate(true);
                });
            }

            StateChange::FilesUpdated { accepted, ignored } => {
                // Buckets only grow mid-scan, so append the tail rows instead
                // of rebuilding the whole model on every file.
                let snapshot = state_manager.snapshot();
                bridge.update_ui(move |ui| {
                    let model = ui.get_accepted_files();
                    if let Some(rows) = model.as_any().downcast_ref::<VecModel<FileEntry>>() {
                        for path in snapshot.accepted_files.iter().skip(rows.row_count()) {
                            rows.push(FileEntry {
                                path: path.as_str().into(),
                                status: status_code(FileStatus::Pending),
                            });
                        }
                    }
                    let model = ui.get_ignored_files();
                    if let Some(rows) = model.as_any().downcast_ref::<VecModel<SharedString>>() {
                        for path in snapshot.ignored_files.iter().skip(rows.row_count()) {
                            rows.push(path.as_str().into());
                        }
                    }
                    ui.set_accepted_count(accepted as i32);
                    ui.set_ignored_count(ignored as i32);
                });
            }

            StateChange::ScanFinished { accepted, ignored } => {
                tracing::info!("Scan finished: {} accepted, {} ignored", accepted, ignored);
                bridge.update_ui(move |ui| {
                    ui.set_is_busy(false);
                    ui.set_progress_indeterminate(false);
                    ui.set_accepted_count(accepted as i32);
                    ui.set_ignored_count(ignored as i32);
                });
            }

            StateChange::ApplyStarted { total } => {
                tracing::info!("Patch run started: {} files", total);
                bridge.update_ui(move |ui| {
                    ui.set_is_busy(true);
                    ui.set_progress_current(0);
                    ui.set_progress_total(total as i32);
                });
            }

            StateChange::FileStarted { index } => {
                Self::set_row_status(bridge, index, FileStatus::Processing);
            }

            StateChange::FileResult { index, patched } => {
                let status = if patched {
                    FileStatus::Patched
                } else {
                    FileStatus::Failed
                };
                Self::set_row_status(bridge, index, status);
            }

            StateChange::ApplyFinished { patched, failed } => {
                tracing::info!("Patch run finished: {} patched, {} failed", patched, failed);
                bridge.update_ui(move |ui| {
                    ui.set_is_busy(false);
                });
            }

            StateChange::ProgressUpdated { current, total } => {
                bridge.update_ui(move |ui| {
                    ui.set_progress_current(current as i32);
                    ui.set_progress_total(total as i32);
                });
            }

            StateChange::OperationChanged { operation } => {
                bridge.update_ui(move |ui| {
                    ui.set_status_message(operation.into());
                });
            }

            StateChange::TargetsChanged {
                glossiness,
                specular_strength,
            } => {
                bridge.update_ui(move |ui| {
                    ui.set_glossiness_text(format_float(glossiness).into());
                    ui.set_specular_strength_text(format_float(specular_strength).into());
                });
            }

            StateChange::FileRemoved { index, accepted } => {
                bridge.update_ui(move |ui| {
                    let model = ui.get_accepted_files();
                    if let Some(rows) = model.as_any().downcast_ref::<VecModel<FileEntry>>() {
                        if index < rows.row_count() {
                            rows.remove(index);
                        }
                    }
                    ui.set_accepted_count(accepted as i32);
                    ui.set_selected_accepted(-1);
                });
            }

            StateChange::FilesCleared => {
                bridge.update_ui(|ui| {
                    ui.set_accepted_files(ModelRc::new(VecModel::<FileEntry>::default()));
                    ui.set_ignored_files(ModelRc::new(VecModel::<SharedString>::default()));
                    ui.set_accepted_count(0);
                    ui.set_ignored_count(0);
                    ui.set_progress_current(0);
                    ui.set_progress_total(0);
                });
            }
        }
    }

    /// Update the status color of one row in the accepted files list
    fn set_row_status(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        index: usize,
        status: FileStatus,
    ) {
        bridge.update_ui(move |ui| {
            let model = ui.get_accepted_files();
            if let Some(mut entry) = model.row_data(index) {
                entry.status = status_code(status);
                model.set_row_data(index, entry);
            }
        });
    }

    /// Show an error dialog
    fn show_error_dialog(
        ui_weak: &slint::Weak<MainWindow>,
        title: impl Into<SharedString>,
        message: impl Into<SharedString>,
    ) {
        if let Some(ui) = ui_weak.upgrade() {
            ui.set_error_title(title.into());
            ui.set_error_message(message.into());
            ui.set_show_error_dialog(true);
        }
    }

    /// Show an informational message dialog
    fn show_message_dialog(
        ui_weak: &slint::Weak<MainWindow>,
        title: impl Into<SharedString>,
        message: impl Into<SharedString>,
    ) {
        if let Some(ui) = ui_weak.upgrade() {
            ui.set_message_title(title.into());
            ui.set_message_text(message.into());
            ui.set_show_message_dialog(true);
        }
    }

    /// Show a native folder picker dialog
    ///
    /// Uses the `rfd` crate to display a native directory dialog, starting
    /// from the current source folder when one is set.
    ///
    /// # Returns
    /// The selected folder path, or None if cancelled
    fn show_folder_picker(start_dir: Option<&camino::Utf8Path>) -> Option<Utf8PathBuf> {
        use rfd::FileDialog;

        let mut dialog = FileDialog::new().set_title("Select Source Folder");
        if let Some(dir) = start_dir {
            if dir.is_dir() {
                dialog = dialog.set_directory(dir.as_std_path());
            }
        }

        dialog.pick_folder().and_then(|path| {
            Utf8PathBuf::try_from(path)
                .map_err(|e| {
                    tracing::error!("Failed to convert path to UTF-8: {}", e);
                    e
                })
                .ok()
        })
    }

    // ===== Scan and Apply Orchestration =====

    /// Run the scan workflow
    ///
    /// The walk itself is blocking file I/O, so it runs on tokio's blocking
    /// pool. Every classified file is pushed into state from inside the walk,
    /// which streams list updates to the UI while the scan is in flight.
    async fn run_scan_workflow(
        state: Arc<StateManager>,
        folder: Utf8PathBuf,
        bridge: EventLoopBridgeHandle<MainWindow>,
    ) {
        tracing::info!("Starting scan workflow for {}", folder);

        state.begin_scan();
        let keywords = state.read(|s| s.keywords.clone());

        let state_for_scan = state.clone();
        let join = tokio::task::spawn_blocking(move || {
            let known_state = state_for_scan.clone();
            let file_state = state_for_scan.clone();
            scan::scan_folder(
                &folder,
                &keywords,
                move |path| known_state.read(|s| s.is_known(path)),
                move |path, verdict| {
                    let accepted = verdict == scan::ScanVerdict::Accepted;
                    if let scan::ScanVerdict::Failed(ref reason) = verdict {
                        tracing::warn!("{}: treated as ignored: {}", path, reason);
                    }
                    file_state.add_scanned_file(path, accepted);
                },
            )
        });

        let summary = match join.await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Scan task panicked: {}", e);
                state.finish_scan();
                return;
            }
        };

        state.finish_scan();

        bridge.update_ui(move |ui| {
            ui.set_message_title("Scan Complete".into());
            ui.set_message_text(
                format!(
                    "{} matching file(s) found, {} ignored.",
                    summary.accepted, summary.ignored
                )
                .into(),
            );
            ui.set_show_message_dialog(true);
        });
    }

    /// Run the apply workflow
    ///
    /// Spawns one task per accepted file; the tasks race for permits on a
    /// semaphore so at most [`MAX_CONCURRENT_NIF_TASKS`] files are being
    /// patched at once. Cancellation is event-driven via a watch channel:
    /// queued tasks abort the moment the signal arrives, and files already
    /// being written finish first so none is left half-patched.
    async fn run_apply_workflow(
        state: Arc<StateManager>,
        bridge: EventLoopBridgeHandle<MainWindow>,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let (files, glossiness, specular_strength, keywords) = state.read(|s| {
            (
                s.accepted_files.clone(),
                s.glossiness,
                s.specular_strength,
                s.keywords.clone(),
            )
        });

        tracing::info!(
            "Starting patch run: {} files, glossiness={}, specular_strength={}",
            files.len(),
            glossiness,
            specular_strength
        );

        state.begin_apply();

        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_NIF_TASKS));
        let keywords = Arc::new(keywords);
        let mut tasks = Vec::new();

        for (index, path) in files.into_iter().enumerate() {
            let state_clone = state.clone();
            let semaphore_clone = semaphore.clone();
            let keywords_clone = keywords.clone();
            let mut cancel_rx_clone = cancel_rx.clone();

            let task = tokio::spawn(async move {
                // Race between acquiring a permit and cancellation: a queued
                // task stops without touching its file.
                let _permit = tokio::select! {
                    permit = semaphore_clone.acquire() => permit.unwrap(),
                    _ = cancel_rx_clone.changed() => {
                        tracing::warn!("Patch run cancelled before starting: {}", path);
                        return;
                    }
                };

                state_clone.mark_file_processing(index);

                let path_clone = path.clone();
                let started = Instant::now();
                let result = tokio::task::spawn_blocking(move || {
                    nif::patch_file(&path_clone, &keywords_clone, glossiness, specular_strength)
                })
                .await;
                metrics().record_patch_time(started.elapsed());

                let patched = match result {
                    Ok(Ok(outcome)) => {
                        let patched = patch_succeeded(&outcome);
                        if !patched {
                            tracing::warn!(
                                "{}: nothing patched (no matching node or no shader blocks)",
                                path
                            );
                        }
                        patched
                    }
                    Ok(Err(e)) => {
                        tracing::error!("{}: patch failed: {}", path, e);
                        false
                    }
                    Err(e) => {
                        tracing::error!("{}: patch task panicked: {}", path, e);
                        false
                    }
                };

                if patched {
                    metrics().record_file_patched();
                } else {
                    metrics().record_file_failed();
                }
                state_clone.record_file_result(index, patched);
            });

            tasks.push(task);
        }

        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!("Task join error: {}", e);
            }
        }

        let (patched, failed, _, total) = state.read(|s| s.apply_stats());
        state.finish_apply();

        tracing::info!(
            "Patch run completed: {} of {} patched, {} failed",
            patched,
            total,
            failed
        );

        bridge.update_ui(move |ui| {
            let message = if failed > 0 {
                format!(
                    "Done with errors: {} file(s) patched, {} failed.",
                    patched, failed
                )
            } else {
                format!("Done. {} file(s) patched.", patched)
            };
            ui.set_message_title("Apply Complete".into());
            ui.set_message_text(message.into());
            ui.set_show_message_dialog(true);
        });
    }
}

/// A file counts as patched only when at least one shader block was
/// rewritten; a keyword match with nothing to change is still a failure.
fn patch_succeeded(outcome: &nif::PatchOutcome) -> bool {
    outcome.blocks_patched > 0
}

/// True when the accepted file count warrants the confirmation dialog.
fn over_soft_limit(accepted: usize, soft_limit: usize) -> bool {
    accepted >= soft_limit
}

/// Map a file status to the color code the Slint list understands.
fn status_code(status: FileStatus) -> i32 {
    match status {
        FileStatus::Pending => 0,
        FileStatus::Processing => 1,
        FileStatus::Patched => 2,
        FileStatus::Failed => 3,
    }
}

/// Render a target value the way the settings file stores it.
fn format_float(value: f32) -> String {
    format!("{}", value)
}
