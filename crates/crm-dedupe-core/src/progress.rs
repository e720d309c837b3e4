/// Trait for reporting duplicate scan progress.
///
/// The CLI implements it with indicatif. Progress is reported once per batch,
/// so a host can repaint between batches. All methods have default no-op
/// implementations.
pub trait ScanReporter: Send + Sync {
    fn on_scan_start(&self, _total_clients: usize) {}
    fn on_phone_progress(&self, _processed: usize, _total: usize) {}
    fn on_name_progress(&self, _processed: usize, _total: usize) {}
    fn on_scan_complete(&self, _groups: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}
