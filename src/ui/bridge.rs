// EventLoopBridge - Coordinates between tokio async runtime and Slint event loop
//
// Two event loops run at once: Slint's single-threaded GUI loop and tokio's
// multi-threaded runtime where scans and patch jobs execute. The bridge
// marshals work between them:
// - UI updates from background tokio tasks via update_ui()
// - Spawning async tasks from Slint callbacks via spawn_async()

use crate::metrics::metrics;
use slint::{ComponentHandle, Weak};
use std::future::Future;
use tokio::sync::mpsc;

/// Coordinates between tokio async runtime and Slint event loop
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new().unwrap();
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone());
///
/// // From a Slint callback, spawn an async task
/// bridge.spawn_async(|| async {
///     // Scan or patch files...
///
///     bridge.update_ui(|ui| {
///         ui.set_status_message("Done".into());
///     });
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Weak reference to the UI component to prevent circular references
    ui_weak: Weak<T>,

    /// Handle to the tokio runtime for spawning async tasks
    tokio_handle: tokio::runtime::Handle,

    /// Channel for sending UI update requests from tokio tasks to the Slint event loop
    /// Bounded to 100 updates to prevent unbounded memory growth if UI lags
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a new EventLoopBridge
    ///
    /// This sets up a background handler thread that processes UI update requests
    /// and marshals them to the Slint event loop using `upgrade_in_event_loop`.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle) -> Self {
        let ui_weak = ui.as_weak();
        // Bounded channel so a burst of per-file updates cannot grow without limit
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<Box<dyn FnOnce(&T) + Send>>(100);

        // Background thread that drains the channel and queues each update
        // onto Slint's event loop thread
        let ui_weak_clone = ui_weak.clone();
        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = ui_weak_clone.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    // The event loop has stopped; nothing left to deliver to
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self {
            ui_weak,
            tokio_handle,
            ui_update_tx,
        }
    }

    /// Schedule a UI update from any thread (typically from tokio tasks)
    ///
    /// The update is queued and executed on the next event loop iteration.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        send_ui_update(&self.ui_update_tx, update);
    }

    /// Spawn an async task on the tokio runtime from a Slint callback
    ///
    /// This is what keeps the UI responsive while a scan or a patch run is
    /// doing file I/O on tokio's thread pool.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Clone the bridge for use in multiple callbacks
    ///
    /// Slint callbacks capture by value, so each one gets its own handle.
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

/// Lightweight handle that can be cloned and passed to callbacks
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    ui_weak: Weak<T>,
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread
    ///
    /// See [`EventLoopBridge::update_ui()`] for details.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        send_ui_update(&self.ui_update_tx, update);
    }

    /// Spawn an async task on the tokio runtime
    ///
    /// See [`EventLoopBridge::spawn_async()`] for details.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Get a weak reference to the UI component
    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}

fn send_ui_update<T, F>(tx: &mpsc::Sender<Box<dyn FnOnce(&T) + Send>>, update: F)
where
    F: FnOnce(&T) + Send + 'static,
{
    match tx.try_send(Box::new(update)) {
        Ok(_) => {
            metrics().record_ui_update();
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            metrics().record_ui_channel_full();
            tracing::warn!("UI update channel full - skipping update to prevent backpressure");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
        }
    }
}
