//! Terminal progress display using indicatif

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use salvage_core::progress::format_hms;
use salvage_core::{ProgressSink, RecoverProgress, ScanProgress};

/// Spinner during the scan, bar during recovery. Bars are created lazily so
/// a scan-only run never shows an empty bar.
pub struct TerminalProgress {
	scan: Mutex<Option<ProgressBar>>,
	recover: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
	pub fn new() -> Self {
		Self {
			scan: Mutex::new(None),
			recover: Mutex::new(None),
		}
	}

	fn spinner() -> ProgressBar {
		let bar = ProgressBar::new_spinner();
		if let Ok(style) = ProgressStyle::default_spinner()
			.template("{spinner:.green} [{elapsed_precise}] {msg}")
		{
			bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
		}
		bar.enable_steady_tick(Duration::from_millis(100));
		bar
	}

	fn bar(total: u64) -> ProgressBar {
		let bar = ProgressBar::new(total);
		if let Ok(style) = ProgressStyle::default_bar()
			.template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
		{
			bar.set_style(style.progress_chars("=> "));
		}
		bar
	}

	/// Clear any live bars before printing the summary
	pub fn finish(&self) {
		for slot in [&self.scan, &self.recover] {
			if let Ok(mut bar) = slot.lock() {
				if let Some(bar) = bar.take() {
					bar.finish_and_clear();
				}
			}
		}
	}
}

impl Default for TerminalProgress {
	fn default() -> Self {
		Self::new()
	}
}

impl ProgressSink for TerminalProgress {
	fn scan_progress(&self, progress: &ScanProgress) {
		let Ok(mut slot) = self.scan.lock() else { return };
		let bar = slot.get_or_insert_with(Self::spinner);
		bar.set_message(format!(
			"Dirs: {} | Files: {} | Listing errors: {:.1}% | {}",
			progress.stats.listed_dirs,
			progress.files_found(),
			progress.error_rate_percent(),
			progress.current_path
		));
	}

	fn recover_progress(&self, progress: &RecoverProgress) {
		if let Ok(mut scan) = self.scan.lock() {
			if let Some(bar) = scan.take() {
				bar.finish_and_clear();
			}
		}

		let Ok(mut slot) = self.recover.lock() else { return };
		let bar = slot.get_or_insert_with(|| Self::bar(progress.total));
		bar.set_position(progress.processed);
		let message = match (progress.rate(), progress.eta()) {
			(Some(rate), Some(eta)) => format!("{:.1}/s | ETA {}", rate, format_hms(eta)),
			_ => String::new(),
		};
		bar.set_message(format!(
			"{} | errors: {}",
			message, progress.stats.recover_errors
		));
	}
}
