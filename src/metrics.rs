// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring application performance

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Get the process-wide metrics instance
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Global performance metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Metrics are collected throughout the application lifecycle and logged
/// on shutdown for performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Total number of files seen by the scanner
    pub files_scanned: AtomicUsize,

    /// Total number of files accepted by the keyword filter
    pub files_accepted: AtomicUsize,

    /// Total number of files ignored by the keyword filter
    pub files_ignored: AtomicUsize,

    /// Total number of files successfully patched
    pub files_patched: AtomicUsize,

    /// Total number of files that failed to patch
    pub files_failed: AtomicUsize,

    /// Total patching time in milliseconds
    pub total_patch_time_ms: AtomicU64,

    /// Number of state updates performed
    pub state_updates: AtomicU64,

    /// Number of state broadcasts sent
    pub state_broadcasts: AtomicU64,

    /// Number of UI updates sent
    pub ui_updates: AtomicU64,

    /// Number of UI update channel full errors
    pub ui_update_channel_full: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            files_scanned: AtomicUsize::new(0),
            files_accepted: AtomicUsize::new(0),
            files_ignored: AtomicUsize::new(0),
            files_patched: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            total_patch_time_ms: AtomicU64::new(0),
            state_updates: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_update_channel_full: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a file seen by the scanner
    pub fn record_file_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file accepted by the keyword filter
    pub fn record_file_accepted(&self) {
        self.files_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file ignored by the keyword filter
    pub fn record_file_ignored(&self) {
        self.files_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful patch
    pub fn record_file_patched(&self) {
        self.files_patched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed patch
    pub fn record_file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record patching time for a file
    pub fn record_patch_time(&self, duration: Duration) {
        self.total_patch_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a state update
    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state broadcast
    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a UI update
    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a UI update channel full error
    pub fn record_ui_channel_full(&self) {
        self.ui_update_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average patch time per file in milliseconds
    pub fn avg_patch_time_ms(&self) -> f64 {
        let total = self.total_patch_time_ms.load(Ordering::Relaxed);
        let count = self.files_patched.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Performance Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Scan: {} files seen, {} accepted, {} ignored",
            self.files_scanned.load(Ordering::Relaxed),
            self.files_accepted.load(Ordering::Relaxed),
            self.files_ignored.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Patch: {} patched, {} failed, total {:.2}s (avg: {:.2}ms per file)",
            self.files_patched.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed),
            self.total_patch_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_patch_time_ms()
        );
        tracing::info!(
            "State updates: {}, broadcasts: {}",
            self.state_updates.load(Ordering::Relaxed),
            self.state_broadcasts.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {}, channel full errors: {}",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_update_channel_full.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.files_scanned.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.files_patched.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_file_operations() {
        let metrics = Metrics::new();

        metrics.record_file_scanned();
        metrics.record_file_scanned();
        metrics.record_file_accepted();
        metrics.record_file_ignored();
        metrics.record_file_patched();
        metrics.record_file_failed();

        assert_eq!(metrics.files_scanned.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.files_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.files_ignored.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.files_patched.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.files_failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_patch_time() {
        let metrics = Metrics::new();

        metrics.record_file_patched();
        metrics.record_patch_time(Duration::from_millis(100));
        metrics.record_file_patched();
        metrics.record_patch_time(Duration::from_millis(200));

        assert_eq!(metrics.total_patch_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_patch_time_ms(), 150.0);
    }

    #[test]
    fn test_avg_patch_time_no_files() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_patch_time_ms(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }

    #[test]
    fn test_state_and_ui_counters() {
        let metrics = Metrics::new();

        metrics.record_state_update();
        metrics.record_state_broadcast();
        metrics.record_ui_update();
        metrics.record_ui_channel_full();

        assert_eq!(metrics.state_updates.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.state_broadcasts.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ui_updates.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ui_update_channel_full.load(Ordering::Relaxed), 1);
    }
}
