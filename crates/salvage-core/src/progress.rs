//! Progress reporting for the scan and recovery passes
//!
//! The walker and executor never format or print anything themselves. They
//! ask a `Ticker` whether an update is due and hand a plain progress value
//! to a `ProgressSink`; the CLI decides how it is displayed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::stats::StatsSnapshot;

/// Default spacing between progress updates
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Throttle: `ready()` returns true at most once per interval
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    last: Mutex<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: Mutex::new(start),
        }
    }

    pub fn ready(&self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&self, now: Instant) -> bool {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if now.saturating_duration_since(*last) >= self.interval {
            *last = now;
            true
        } else {
            false
        }
    }
}

/// Running totals during the scan pass
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub stats: StatsSnapshot,
    pub current_path: String,
    pub elapsed: Duration,
}

impl ScanProgress {
    pub fn files_found(&self) -> u64 {
        self.stats.files_found
    }

    pub fn error_rate_percent(&self) -> f64 {
        self.stats.error_rate_percent()
    }
}

/// Running totals during the recovery pass
#[derive(Debug, Clone)]
pub struct RecoverProgress {
    pub processed: u64,
    pub total: u64,
    pub elapsed: Duration,
    pub stats: StatsSnapshot,
}

impl RecoverProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }

    /// Items per second; `None` until something has been processed
    pub fn rate(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.processed == 0 || secs <= 0.0 {
            None
        } else {
            Some(self.processed as f64 / secs)
        }
    }

    pub fn eta(&self) -> Option<Duration> {
        estimate_remaining(self.processed, self.total, self.elapsed)
    }
}

/// Time left at the observed rate. `None` before the first item completes
/// or while no time has elapsed.
pub fn estimate_remaining(processed: u64, total: u64, elapsed: Duration) -> Option<Duration> {
    let secs = elapsed.as_secs_f64();
    if processed == 0 || secs <= 0.0 {
        return None;
    }
    let rate = processed as f64 / secs;
    let remaining = total.saturating_sub(processed) as f64;
    Some(Duration::from_secs_f64(remaining / rate))
}

/// `01h 02m 03s`
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}h {:02}m {:02}s",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Receives throttled progress updates
pub trait ProgressSink: Send + Sync {
    fn scan_progress(&self, progress: &ScanProgress);
    fn recover_progress(&self, progress: &RecoverProgress);
}

/// Discards all updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn scan_progress(&self, _progress: &ScanProgress) {}
    fn recover_progress(&self, _progress: &RecoverProgress) {}
}

/// Emits progress as `tracing` info lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn scan_progress(&self, progress: &ScanProgress) {
        tracing::info!(
            "Scanning: {} files found, {:.1}% listing errors ({})",
            progress.files_found(),
            progress.error_rate_percent(),
            progress.current_path
        );
    }

    fn recover_progress(&self, progress: &RecoverProgress) {
        match (progress.rate(), progress.eta()) {
            (Some(rate), Some(eta)) => tracing::info!(
                "Recovering: {}/{} ({:.1}%), {:.1} files/s, ETA {}",
                progress.processed,
                progress.total,
                progress.percent(),
                rate,
                format_hms(eta)
            ),
            _ => tracing::info!(
                "Recovering: {}/{} ({:.1}%)",
                progress.processed,
                progress.total,
                progress.percent()
            ),
        }
    }
}
