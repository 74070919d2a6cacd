//! Run statistics shared by the walker, lister and executor

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one scan or recovery run. Atomic so extraction workers can
/// update them without a lock; a fresh value is created per run.
#[derive(Debug, Default)]
pub struct RunStats {
    listed_dirs: AtomicU64,
    list_errors: AtomicU64,
    files_found: AtomicU64,
    files_processed: AtomicU64,
    files_recovered: AtomicU64,
    files_skipped: AtomicU64,
    recover_errors: AtomicU64,
    bytes_written: AtomicU64,
    bytes_trimmed: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        for counter in [
            &self.listed_dirs,
            &self.list_errors,
            &self.files_found,
            &self.files_processed,
            &self.files_recovered,
            &self.files_skipped,
            &self.recover_errors,
            &self.bytes_written,
            &self.bytes_trimmed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Counts every attempted listing, failed or not
    pub fn record_listing(&self) {
        self.listed_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_list_error(&self) {
        self.list_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the new running total
    pub fn record_file_found(&self) -> u64 {
        self.files_found.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the new running total
    pub fn record_processed(&self) -> u64 {
        self.files_processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_recovered(&self, bytes: u64, trimmed: u64) {
        self.files_recovered.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.bytes_trimmed.fetch_add(trimmed, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recover_error(&self) {
        self.recover_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            listed_dirs: self.listed_dirs.load(Ordering::Relaxed),
            list_errors: self.list_errors.load(Ordering::Relaxed),
            files_found: self.files_found.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_recovered: self.files_recovered.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            recover_errors: self.recover_errors.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_trimmed: self.bytes_trimmed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `RunStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub listed_dirs: u64,
    pub list_errors: u64,
    pub files_found: u64,
    pub files_processed: u64,
    pub files_recovered: u64,
    pub files_skipped: u64,
    pub recover_errors: u64,
    pub bytes_written: u64,
    pub bytes_trimmed: u64,
}

impl StatsSnapshot {
    /// Failed listings as a percentage of attempted listings
    pub fn error_rate_percent(&self) -> f64 {
        if self.listed_dirs == 0 {
            0.0
        } else {
            self.list_errors as f64 * 100.0 / self.listed_dirs as f64
        }
    }
}
