use colored::*;
use crm_dedupe_core::ScanReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using an indicatif bar over both scan phases.
///
/// The bar runs to twice the client count: phone grouping fills the first
/// half, name clustering the second.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ScanReporter for CliReporter {
    fn on_scan_start(&self, total_clients: usize) {
        let pb = ProgressBar::new(total_clients as u64 * 2);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {percent}%",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.set_message("Grouping phones");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn on_phone_progress(&self, processed: usize, _total: usize) {
        self.with_bar(|pb| pb.set_position(processed as u64));
    }

    fn on_name_progress(&self, processed: usize, total: usize) {
        self.with_bar(|pb| {
            pb.set_message("Comparing names");
            pb.set_position((total + processed) as u64);
        });
    }

    fn on_scan_complete(&self, groups: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} duplicate groups in {:.2}s",
            "✓".green(),
            groups,
            duration_secs
        );
    }
}
