use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod error;
pub mod executor;
pub mod lister;
pub mod manifest;
pub mod mirror;
pub mod probe;
pub mod progress;
pub mod stats;
pub mod walker;

pub use error::{ItemError, ProbeError, Result, SalvageError};
pub use executor::{RecoverOptions, RecoveryExecutor, RecoveryReport, TrimPolicy};
pub use lister::{EntryLister, Listing};
pub use manifest::ScanManifest;
pub use mirror::PathMirror;
pub use probe::{CommandProbe, ListOutput, MemoryProbe, ProbeStatus, VolumeProbe};
pub use progress::{LogProgress, NoProgress, ProgressSink, RecoverProgress, ScanProgress};
pub use stats::{RunStats, StatsSnapshot};
pub use walker::{TreeWalker, WalkOptions, WalkOutput};

/// File name skipped by default wherever it appears
pub const DEFAULT_IGNORE_NAME: &str = ".DS_Store";

/// The volume being recovered: a device plus a namespace (volume) index
/// inside its container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeHandle {
    pub device: String,
    pub index: u32,
}

impl VolumeHandle {
    pub fn new(device: impl Into<String>, index: u32) -> Self {
        Self {
            device: device.into(),
            index,
        }
    }
}

impl std::fmt::Display for VolumeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.device, self.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    File,
}

/// One child of a listed directory. `name` is the final path component only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// An absolute volume path queued for recovery
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkItem {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Directories pruned from traversal. Matching is exact on normalized
/// paths, so excluding `/a/b` leaves `/a/bc` alone.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| mirror::normalize_volume_path(p.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&mirror::normalize_volume_path(path))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sorted copy of the excluded paths
    pub fn to_vec(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.paths.iter().cloned().collect();
        paths.sort();
        paths
    }
}

/// What happened to one WorkItem during a recovery pass
#[derive(Debug)]
pub enum RecoveryOutcome {
    /// Output already existed with non-zero size
    Skipped,
    /// Probe succeeded; `bytes` kept on disk, `trimmed` zero bytes dropped
    Recovered { bytes: u64, trimmed: u64 },
    Failed(ItemError),
}

/// Scan the volume and return the persisted work list.
pub fn scan_volume(
    probe: &dyn VolumeProbe,
    volume: &VolumeHandle,
    options: &WalkOptions,
    sink: &dyn ProgressSink,
) -> Result<ScanManifest> {
    if !options.root.starts_with('/') {
        return Err(SalvageError::Config(format!(
            "source root `{}` must be an absolute volume path",
            options.root
        )));
    }

    tracing::info!("Scanning {} on {}", options.root, volume);

    let stats = RunStats::new();
    let walker = TreeWalker::new(probe, volume, options, &stats, sink);
    let output = walker.scan()?;

    let snapshot = stats.snapshot();
    tracing::info!(
        "Scan complete: {} directories listed ({} errors, {:.1}%), {} files found",
        snapshot.listed_dirs,
        snapshot.list_errors,
        snapshot.error_rate_percent(),
        snapshot.files_found
    );

    Ok(ScanManifest::new(volume.clone(), options, output, snapshot))
}

/// Recover every item of a manifest into `options.output_root`.
pub fn recover_manifest(
    probe: &dyn VolumeProbe,
    manifest: &ScanManifest,
    options: &RecoverOptions,
    sink: &dyn ProgressSink,
) -> Result<RecoveryReport> {
    std::fs::create_dir_all(&options.output_root).map_err(|source| SalvageError::Io {
        path: options.output_root.clone(),
        source,
    })?;

    tracing::info!(
        "Recovering {} files from {} into {}",
        manifest.items.len(),
        manifest.volume,
        options.output_root.display()
    );

    let executor = RecoveryExecutor::new(probe, &manifest.volume, &manifest.source_root, options, sink);
    let report = executor.run(&manifest.items)?;
    if options.mirror_empty_dirs {
        executor.mirror_directories(&manifest.directories);
    }

    tracing::info!(
        "Recovery complete: {}/{} processed, {} recovered, {} skipped, {} errors",
        report.stats.files_processed,
        manifest.items.len(),
        report.stats.files_recovered,
        report.stats.files_skipped,
        report.stats.recover_errors
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_set_normalizes_trailing_slash() {
        let set = ExclusionSet::new(["/Users/alice/Library/", "/private"]);
        assert!(set.contains("/Users/alice/Library"));
        assert!(set.contains("/private/"));
        assert!(!set.contains("/Users/alice/Library/Caches"));
        assert!(!set.contains("/privateer"));
        assert_eq!(set.to_vec(), vec!["/Users/alice/Library", "/private"]);
    }

    #[test]
    fn test_scan_rejects_relative_root() {
        let probe = MemoryProbe::new();
        let options = WalkOptions::new("Users/alice");
        let err = scan_volume(&probe, &VolumeHandle::new("/dev/disk2s2", 0), &options, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, SalvageError::Config(_)));
    }
}
