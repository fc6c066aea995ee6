//! NifBatch - Batch shader parameter editor for Gamebryo mesh files
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend. It initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (4 worker threads for file I/O)
//! - State management ([`StateManager`])
//! - Settings loading ([`SettingsManager`])
//! - GUI controller ([`GuiController`] - bridges Slint UI with business logic)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Handle async operations (directory scans, mesh patching)
//! - **State listener**: Background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Load settings from nifbatch.ini (created with defaults on first run)
//! 2. Initialize logging → logs/nifbatch.<date>
//! 3. Create tokio runtime with 4 worker threads
//! 4. Create StateManager (Arc<RwLock<AppState>>) and seed it from settings
//! 5. Create GuiController (wires Slint UI to state and runtime)
//! 6. Run Slint event loop (blocks until window closed)
//! 7. Shutdown tokio runtime with 5s timeout and log the metrics summary
//!
//! # Platform
//!
//! Primary platform: Windows 10/11 (x86_64)
//! Secondary: Cross-platform via Slint and tokio

use anyhow::Result;
use nifbatch::ui::GuiController;
use nifbatch::{APP_NAME, SettingsManager, StateManager, VERSION};
use std::sync::Arc;

/// Main entry point for the NifBatch GUI application
///
/// # Errors
///
/// This function can fail if:
/// - The settings file cannot be created or read
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - Slint UI initialization fails (graphics drivers, display)
/// - GUI encounters a fatal error during execution
fn main() -> Result<()> {
    // Settings first: the log level and enable flag live in the INI file
    let settings_manager = Arc::new(SettingsManager::new("nifbatch.ini")?);
    let settings = settings_manager.load()?;

    // Keep the guard alive for the whole run so buffered log lines get flushed
    let _log_guard = nifbatch::logging::setup_logging(
        "logs",
        "nifbatch",
        &settings.log_level,
        settings.log_enabled,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for async operations
    // This handles directory scans and mesh patching off the UI thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("nifbatch-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 4);

    // Create state manager for application state
    let state_manager = Arc::new(StateManager::new());
    state_manager.load_from_settings(&settings);
    tracing::info!("State manager initialized from settings");

    // Create GUI controller
    // This wires up the Slint UI with state management and the tokio runtime
    let gui_controller = GuiController::new(
        state_manager.clone(),
        settings_manager,
        runtime.handle().clone(),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Run the GUI (blocks until window is closed)
    // The tokio runtime stays alive in the background to handle async tasks
    let result = gui_controller.run();

    // Clean up after window closes
    tracing::info!("GUI closed, shutting down");

    // Shutdown the tokio runtime gracefully
    // In-flight file writes get five seconds to finish; queued patch tasks
    // were already cancelled by the controller on window close
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    nifbatch::metrics::metrics().log_summary();
    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
