//! Tree Walker: depth-first enumeration of the source namespace
//!
//! Traversal uses an explicit stack rather than recursion, so very deep
//! trees cannot exhaust the call stack. Order is pre-order: a directory's
//! files are emitted before anything in its subdirectories, and siblings
//! keep the order the listing probe reported them in.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::ProbeError;
use crate::lister::EntryLister;
use crate::mirror::{join_volume_path, normalize_volume_path};
use crate::probe::VolumeProbe;
use crate::progress::{ProgressSink, ScanProgress, Ticker, DEFAULT_PROGRESS_INTERVAL};
use crate::stats::RunStats;
use crate::{ExclusionSet, VolumeHandle, WorkItem, DEFAULT_IGNORE_NAME};

/// Scan configuration
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub root: String,
    pub exclusions: ExclusionSet,
    /// File names never queued, wherever they occur
    pub ignore_names: HashSet<String>,
    pub progress_interval: Duration,
}

impl WalkOptions {
    pub fn new(root: &str) -> Self {
        Self {
            root: normalize_volume_path(root),
            exclusions: ExclusionSet::default(),
            ignore_names: HashSet::from([DEFAULT_IGNORE_NAME.to_string()]),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Replaces the default ignore list
    pub fn with_ignore_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Everything one scan pass produced
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Files to recover, in traversal order
    pub items: Vec<WorkItem>,
    /// Every directory reached and not pruned, in traversal order
    pub directories: Vec<String>,
}

pub struct TreeWalker<'a> {
    lister: EntryLister<'a>,
    options: &'a WalkOptions,
    stats: &'a RunStats,
    sink: &'a dyn ProgressSink,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        probe: &'a dyn VolumeProbe,
        volume: &'a VolumeHandle,
        options: &'a WalkOptions,
        stats: &'a RunStats,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            lister: EntryLister::new(probe, volume, stats),
            options,
            stats,
            sink,
        }
    }

    /// Walk the whole tree under the configured root
    pub fn scan(&self) -> Result<WalkOutput, ProbeError> {
        let mut output = WalkOutput::default();
        self.walk(
            |item| output.items.push(item),
            |dir| output.directories.push(dir.to_string()),
        )?;
        Ok(output)
    }

    /// Stream files and directories to the callbacks as they are found
    pub fn walk<F, D>(&self, mut on_file: F, mut on_dir: D) -> Result<(), ProbeError>
    where
        F: FnMut(WorkItem),
        D: FnMut(&str),
    {
        let started = Instant::now();
        let ticker = Ticker::new(self.options.progress_interval);
        let mut stack = vec![self.options.root.clone()];

        while let Some(path) = stack.pop() {
            if self.options.exclusions.contains(&path) {
                debug!("Pruning excluded directory {}", path);
                continue;
            }

            trace!("Scanning {}", path);
            on_dir(&path);
            let listing = self.lister.list(&path)?;

            for name in &listing.files {
                if self.options.ignore_names.contains(name) {
                    continue;
                }
                self.stats.record_file_found();
                on_file(WorkItem::new(join_volume_path(&path, name)));
            }

            // Reverse push so the first listed directory is visited next
            for name in listing.dirs.iter().rev() {
                if name == "." || name == ".." || name.contains('/') {
                    warn!("Skipping unusable directory name {:?} in {}", name, path);
                    continue;
                }
                stack.push(join_volume_path(&path, name));
            }

            if ticker.ready() {
                self.sink.scan_progress(&ScanProgress {
                    stats: self.stats.snapshot(),
                    current_path: path,
                    elapsed: started.elapsed(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MemoryProbe;
    use crate::progress::{NoProgress, RecoverProgress};
    use crate::EntryKind;
    use std::sync::Mutex;

    fn volume() -> VolumeHandle {
        VolumeHandle::new("/dev/disk2s2", 0)
    }

    fn scan(probe: &MemoryProbe, options: &WalkOptions) -> (WalkOutput, RunStats) {
        let volume = volume();
        let stats = RunStats::new();
        let output = TreeWalker::new(probe, &volume, options, &stats, &NoProgress)
            .scan()
            .unwrap();
        (output, stats)
    }

    fn paths(output: &WalkOutput) -> Vec<&str> {
        output.items.iter().map(WorkItem::as_str).collect()
    }

    #[test]
    fn test_preorder_traversal() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/top.txt", "t")
            .add_file("/src/a/a1.txt", "a1")
            .add_file("/src/a/deep/d.txt", "d")
            .add_file("/src/b/b1.txt", "b1")
            .add_file("/src/a/a2.txt", "a2");

        let (output, stats) = scan(&probe, &WalkOptions::new("/src"));
        assert_eq!(
            paths(&output),
            vec![
                "/src/top.txt",
                "/src/a/a1.txt",
                "/src/a/a2.txt",
                "/src/a/deep/d.txt",
                "/src/b/b1.txt",
            ]
        );
        assert_eq!(output.directories, vec!["/src", "/src/a", "/src/a/deep", "/src/b"]);
        assert_eq!(stats.snapshot().files_found, 5);
        assert_eq!(stats.snapshot().listed_dirs, 4);
    }

    #[test]
    fn test_exclusion_prunes_subtree_only() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/keep/k.txt", "k")
            .add_file("/src/skip/s.txt", "s")
            .add_file("/src/skip/inner/i.txt", "i")
            .add_file("/src/skipped-not/n.txt", "n");

        let options = WalkOptions::new("/src").with_exclusions(ExclusionSet::new(["/src/skip"]));
        let (output, _) = scan(&probe, &options);

        assert_eq!(paths(&output), vec!["/src/keep/k.txt", "/src/skipped-not/n.txt"]);
        assert!(!output.directories.iter().any(|d| d.starts_with("/src/skip/") || d == "/src/skip"));
        // The excluded directory is never listed
        assert_eq!(probe.list_calls(), 3);
    }

    #[test]
    fn test_excluded_root_yields_nothing() {
        let mut probe = MemoryProbe::new();
        probe.add_file("/src/a.txt", "a");

        let options = WalkOptions::new("/src").with_exclusions(ExclusionSet::new(["/src"]));
        let (output, _) = scan(&probe, &options);
        assert!(output.items.is_empty());
        assert!(output.directories.is_empty());
        assert_eq!(probe.list_calls(), 0);
    }

    #[test]
    fn test_ignore_name_filtered_at_every_depth() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/.DS_Store", "x")
            .add_file("/src/a/.DS_Store", "x")
            .add_file("/src/a/b/c/.DS_Store", "x")
            .add_file("/src/a/b/c/real.txt", "r")
            .add_file("/src/a/.DS_Store.bak", "kept");

        let (output, stats) = scan(&probe, &WalkOptions::new("/src"));
        assert_eq!(paths(&output), vec!["/src/a/.DS_Store.bak", "/src/a/b/c/real.txt"]);
        assert_eq!(stats.snapshot().files_found, 2);
    }

    #[test]
    fn test_custom_ignore_names() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/Thumbs.db", "x")
            .add_file("/src/.DS_Store", "x");

        let options = WalkOptions::new("/src").with_ignore_names(["Thumbs.db"]);
        let (output, _) = scan(&probe, &options);
        assert_eq!(paths(&output), vec!["/src/.DS_Store"]);
    }

    #[test]
    fn test_listing_failure_is_isolated() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/bad/one.txt", "1")
            .add_file("/src/bad/two.txt", "2")
            .add_file("/src/good/g.txt", "g")
            .add_file("/src/z.txt", "z")
            .fail_listing("/src/bad");

        let (output, stats) = scan(&probe, &WalkOptions::new("/src"));
        assert_eq!(paths(&output), vec!["/src/z.txt", "/src/good/g.txt"]);
        // The unreadable directory was still reached
        assert!(output.directories.contains(&"/src/bad".to_string()));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.list_errors, 1);
        assert_eq!(snapshot.listed_dirs, 3);
    }

    #[test]
    fn test_unusable_directory_names_are_not_followed() {
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/outside.txt", "secret")
            .add_file("/src/a.txt", "a")
            .add_entry("/src", "..", EntryKind::Directory)
            .add_entry("/src", ".", EntryKind::Directory)
            .add_entry("/src", "b/c", EntryKind::Directory);

        let (output, stats) = scan(&probe, &WalkOptions::new("/src"));
        assert_eq!(paths(&output), vec!["/src/a.txt"]);
        assert_eq!(output.directories, vec!["/src"]);
        assert_eq!(probe.list_calls(), 1);
        assert_eq!(stats.snapshot().listed_dirs, 1);
        assert_eq!(stats.snapshot().list_errors, 0);
    }

    #[test]
    fn test_volume_root_scan() {
        let mut probe = MemoryProbe::new();
        probe.add_file("/Users/alice/notes.txt", "n");

        let (output, _) = scan(&probe, &WalkOptions::new("/"));
        assert_eq!(paths(&output), vec!["/Users/alice/notes.txt"]);
        assert_eq!(output.directories, vec!["/", "/Users", "/Users/alice"]);
    }

    struct RecordingSink(Mutex<Vec<u64>>);

    impl ProgressSink for RecordingSink {
        fn scan_progress(&self, progress: &ScanProgress) {
            self.0.lock().unwrap().push(progress.files_found());
        }

        fn recover_progress(&self, _progress: &RecoverProgress) {}
    }

    #[test]
    fn test_scan_progress_reports_running_counts() {
        let mut probe = MemoryProbe::new();
        probe.add_file("/src/a/1.txt", "1").add_file("/src/b/2.txt", "2");

        let volume = volume();
        let stats = RunStats::new();
        let sink = RecordingSink(Mutex::new(Vec::new()));
        let options = WalkOptions::new("/src").with_progress_interval(Duration::ZERO);
        TreeWalker::new(&probe, &volume, &options, &stats, &sink)
            .scan()
            .unwrap();

        // One update per directory with a zero interval
        assert_eq!(*sink.0.lock().unwrap(), vec![0, 1, 2]);
    }
}
