//! Recovery Executor: extract every WorkItem into the mirrored output tree
//!
//! Each item goes through:
//! 1. map the volume path onto the output root
//! 2. skip if the output already exists with non-zero size
//! 3. create the parent directory (once per distinct directory)
//! 4. stream the extraction probe into `<name>.salvage-partial`
//! 5. on success, drop trailing zero padding and rename into place
//!
//! A failed or interrupted attempt never leaves anything at the final path,
//! so the existence check in step 2 only ever sees finished files.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{ItemError, ProbeError, Result};
use crate::mirror::PathMirror;
use crate::probe::VolumeProbe;
use crate::progress::{ProgressSink, RecoverProgress, Ticker, DEFAULT_PROGRESS_INTERVAL};
use crate::stats::{RunStats, StatsSnapshot};
use crate::{RecoveryOutcome, VolumeHandle, WorkItem};

/// Suffix of in-progress output files
pub const PARTIAL_SUFFIX: &str = ".salvage-partial";

/// What to do with zero bytes at the end of extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Drop them: recovered blocks are padded to the allocation unit
    #[default]
    TrailingZeros,
    /// Keep the probe output byte for byte
    Verbatim,
}

#[derive(Debug, Clone)]
pub struct RecoverOptions {
    pub output_root: PathBuf,
    pub trim: TrimPolicy,
    /// Concurrent extractions; 1 processes items strictly in order
    pub workers: usize,
    /// Also create directories that contain no files
    pub mirror_empty_dirs: bool,
    pub progress_interval: Duration,
}

impl RecoverOptions {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            trim: TrimPolicy::default(),
            workers: 1,
            mirror_empty_dirs: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_mirror_empty_dirs(mut self, enabled: bool) -> Self {
        self.mirror_empty_dirs = enabled;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Summary of one recovery pass
#[derive(Debug, Clone)]
pub struct RecoveryReport {
    pub stats: StatsSnapshot,
    pub duration: Duration,
    /// Failed items with the reason, in completion order
    pub failures: Vec<(WorkItem, String)>,
}

/// Content length with trailing zero bytes removed
pub fn trim_trailing_zeros(data: &[u8]) -> &[u8] {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &data[..end]
}

/// Passes writes through while remembering where the last non-zero byte
/// ended, so padding can be cut off without buffering the content.
pub struct ZeroTrimWriter<W> {
    inner: W,
    written: u64,
    content_len: u64,
}

impl<W: Write> ZeroTrimWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            written: 0,
            content_len: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Bytes up to and including the last non-zero byte
    pub fn content_len(&self) -> u64 {
        self.content_len
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ZeroTrimWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        let kept = trim_trailing_zeros(&buf[..n]).len();
        if kept > 0 {
            self.content_len = self.written + kept as u64;
        }
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Output paths currently being written; one writer per path
#[derive(Default)]
struct ClaimSet(Mutex<HashSet<PathBuf>>);

struct Claim<'a> {
    set: &'a ClaimSet,
    path: PathBuf,
}

impl ClaimSet {
    fn try_claim(&self, path: &Path) -> Option<Claim<'_>> {
        if lock(&self.0).insert(path.to_path_buf()) {
            Some(Claim {
                set: self,
                path: path.to_path_buf(),
            })
        } else {
            None
        }
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        lock(&self.set.0).remove(&self.path);
    }
}

/// Output directories known to exist
#[derive(Default)]
struct DirCache(Mutex<HashSet<PathBuf>>);

impl DirCache {
    fn ensure(&self, dir: &Path) -> io::Result<()> {
        let mut created = lock(&self.0);
        if created.contains(dir) {
            return Ok(());
        }
        fs::create_dir_all(dir)?;
        created.insert(dir.to_path_buf());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Cut `file` to `len` bytes and move it from `partial` to `output`
fn finish_output(file: File, len: u64, partial: &Path, output: &Path) -> io::Result<()> {
    if file.metadata()?.len() > len {
        file.set_len(len)?;
    }
    file.sync_all()?;
    drop(file);
    fs::rename(partial, output)
}

/// Staging files share the output directory, so no recovered file may
/// carry their suffix.
fn is_partial_name(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |n| n.to_string_lossy().ends_with(PARTIAL_SUFFIX))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

pub struct RecoveryExecutor<'a> {
    probe: &'a dyn VolumeProbe,
    volume: &'a VolumeHandle,
    mirror: PathMirror,
    options: &'a RecoverOptions,
    sink: &'a dyn ProgressSink,
    stats: RunStats,
    dirs: DirCache,
    claims: ClaimSet,
}

impl<'a> RecoveryExecutor<'a> {
    pub fn new(
        probe: &'a dyn VolumeProbe,
        volume: &'a VolumeHandle,
        source_root: &str,
        options: &'a RecoverOptions,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            probe,
            volume,
            mirror: PathMirror::new(source_root, &options.output_root),
            options,
            sink,
            stats: RunStats::new(),
            dirs: DirCache::default(),
            claims: ClaimSet::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process every item. Only a probe that cannot be started stops the
    /// pass; per-item failures are counted and reported.
    pub fn run(&self, items: &[WorkItem]) -> Result<RecoveryReport> {
        self.stats.reset();
        let started = Instant::now();
        let ticker = Ticker::new(self.options.progress_interval);
        let failures = Mutex::new(Vec::new());
        let total = items.len() as u64;

        let process = |item: &WorkItem| -> std::result::Result<(), ProbeError> {
            let outcome = self.recover_one(item)?;
            if let RecoveryOutcome::Failed(e) = outcome {
                lock(&failures).push((item.clone(), e.to_string()));
            }

            let processed = self.stats.record_processed();
            if ticker.ready() {
                self.sink.recover_progress(&RecoverProgress {
                    processed,
                    total,
                    elapsed: started.elapsed(),
                    stats: self.stats.snapshot(),
                });
            }
            Ok(())
        };

        if self.options.workers <= 1 {
            items.iter().try_for_each(process)?;
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.workers)
                .thread_name(|i| format!("salvage-extract-{}", i))
                .build()?;
            pool.install(|| items.par_iter().try_for_each(process))?;
        }

        let failures = match failures.into_inner() {
            Ok(failures) => failures,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(RecoveryReport {
            stats: self.stats.snapshot(),
            duration: started.elapsed(),
            failures,
        })
    }

    /// Recover a single item, updating the run counters
    pub fn recover_one(&self, item: &WorkItem) -> std::result::Result<RecoveryOutcome, ProbeError> {
        let outcome = match self.mirror.output_path(item.as_str()) {
            Ok(output) if is_partial_name(&output) => {
                RecoveryOutcome::Failed(ItemError::ReservedName(item.to_string()))
            }
            Ok(output) => self.extract_to(item, &output)?,
            Err(e) => RecoveryOutcome::Failed(e),
        };

        match &outcome {
            RecoveryOutcome::Skipped => {
                self.stats.record_skipped();
                debug!("Skipping {}, already recovered", item);
            }
            RecoveryOutcome::Recovered { bytes, trimmed } => {
                self.stats.record_recovered(*bytes, *trimmed);
                debug!("Recovered {}: {} -> {} bytes", item, bytes + trimmed, bytes);
            }
            RecoveryOutcome::Failed(e) => {
                self.stats.record_recover_error();
                warn!("Failed to recover {}: {}", item, e);
            }
        }
        Ok(outcome)
    }

    fn extract_to(
        &self,
        item: &WorkItem,
        output: &Path,
    ) -> std::result::Result<RecoveryOutcome, ProbeError> {
        let Some(_claim) = self.claims.try_claim(output) else {
            // Same path queued twice and already in flight
            return Ok(RecoveryOutcome::Skipped);
        };

        if fs::metadata(output).map_or(false, |m| m.is_file() && m.len() > 0) {
            return Ok(RecoveryOutcome::Skipped);
        }

        if let Some(parent) = output.parent() {
            if let Err(e) = self.dirs.ensure(parent) {
                return Ok(RecoveryOutcome::Failed(ItemError::Output(e)));
            }
        }

        let partial = partial_path(output);
        let file = match File::create(&partial) {
            Ok(file) => file,
            Err(e) => return Ok(RecoveryOutcome::Failed(ItemError::Output(e))),
        };

        let mut writer = ZeroTrimWriter::new(BufWriter::new(file));
        let status = match self.probe.extract(self.volume, item.as_str(), &mut writer) {
            Ok(status) => status,
            Err(ProbeError::Io(e)) => return Ok(RecoveryOutcome::Failed(ItemError::Output(e))),
            Err(e) => return Err(e),
        };

        let written = writer.written();
        let content_len = writer.content_len();
        let file = match writer.into_inner().into_inner() {
            Ok(file) => file,
            Err(e) => return Ok(RecoveryOutcome::Failed(ItemError::Output(e.into_error()))),
        };

        if !status.is_success() {
            // The partial file stays behind as evidence of the attempt
            return Ok(RecoveryOutcome::Failed(ItemError::Probe(status)));
        }

        let kept = match self.options.trim {
            TrimPolicy::TrailingZeros => content_len,
            TrimPolicy::Verbatim => written,
        };
        if let Err(e) = finish_output(file, kept, &partial, output) {
            return Ok(RecoveryOutcome::Failed(ItemError::Output(e)));
        }

        Ok(RecoveryOutcome::Recovered {
            bytes: kept,
            trimmed: written - kept,
        })
    }

    /// Create every directory of the scan in the output tree, including
    /// those that held no files. Failures are logged and skipped.
    pub fn mirror_directories(&self, directories: &[String]) {
        for dir in directories {
            let target = match self.mirror.output_path(dir) {
                Ok(target) => target,
                Err(e) => {
                    warn!("Not mirroring directory {}: {}", dir, e);
                    continue;
                }
            };
            if let Err(e) = self.dirs.ensure(&target) {
                warn!("Failed to create {}: {}", target.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ListOutput, MemoryProbe, ProbeStatus};
    use crate::progress::NoProgress;
    use tempfile::TempDir;

    fn volume() -> VolumeHandle {
        VolumeHandle::new("/dev/disk2s2", 0)
    }

    fn items(paths: &[&str]) -> Vec<WorkItem> {
        paths.iter().map(|p| WorkItem::new(*p)).collect()
    }

    #[test]
    fn test_trim_trailing_zeros() {
        let mut padded = b"ABC".to_vec();
        padded.extend(std::iter::repeat(0u8).take(100));
        assert_eq!(trim_trailing_zeros(&padded), b"ABC");
        assert_eq!(trim_trailing_zeros(&[0u8; 64]), b"");
        assert_eq!(trim_trailing_zeros(b"A\0B"), b"A\0B");
        assert_eq!(trim_trailing_zeros(b""), b"");
    }

    #[test]
    fn test_zero_trim_writer_across_chunks() {
        let mut writer = ZeroTrimWriter::new(Vec::new());
        writer.write_all(b"AB\0\0").unwrap();
        writer.write_all(b"\0\0").unwrap();
        writer.write_all(b"C\0").unwrap();
        writer.write_all(b"\0\0\0").unwrap();

        assert_eq!(writer.written(), 11);
        assert_eq!(writer.content_len(), 7);
        assert_eq!(writer.into_inner(), b"AB\0\0\0\0C\0\0\0\0");
    }

    #[test]
    fn test_recover_trims_padding_and_mirrors_path() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dst");
        let mut content = b"ABC".to_vec();
        content.extend([0u8; 100]);

        let mut probe = MemoryProbe::new();
        probe.add_file("/src/a/b/c.txt", content);

        let volume = volume();
        let options = RecoverOptions::new(&out);
        let executor = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress);
        let report = executor.run(&items(&["/src/a/b/c.txt"])).unwrap();

        let target = out.join("a").join("b").join("c.txt");
        assert!(out.join("a").join("b").is_dir());
        assert_eq!(fs::read(&target).unwrap(), b"ABC");
        assert!(!partial_path(&target).exists());
        assert_eq!(report.stats.files_recovered, 1);
        assert_eq!(report.stats.bytes_written, 3);
        assert_eq!(report.stats.bytes_trimmed, 100);
    }

    #[test]
    fn test_all_zero_content_becomes_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe.add_file("/src/zeros.bin", vec![0u8; 4096]);

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let executor = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress);
        executor.run(&items(&["/src/zeros.bin"])).unwrap();

        assert_eq!(fs::read(temp_dir.path().join("zeros.bin")).unwrap(), b"");
    }

    #[test]
    fn test_verbatim_keeps_padding() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe.add_file("/src/a.bin", b"AB\0\0".to_vec());

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path()).with_trim(TrimPolicy::Verbatim);
        let executor = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress);
        let report = executor.run(&items(&["/src/a.bin"])).unwrap();

        assert_eq!(fs::read(temp_dir.path().join("a.bin")).unwrap(), b"AB\0\0");
        assert_eq!(report.stats.bytes_trimmed, 0);
    }

    #[test]
    fn test_second_run_skips_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/one.txt", "one")
            .add_file("/src/sub/two.txt", "two");
        let work = items(&["/src/one.txt", "/src/sub/two.txt"]);

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let first = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&work)
            .unwrap();
        assert_eq!(first.stats.files_recovered, 2);
        assert_eq!(probe.extract_calls(), 2);

        let second = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&work)
            .unwrap();
        assert_eq!(second.stats.files_skipped, 2);
        assert_eq!(second.stats.files_recovered, 0);
        assert_eq!(second.stats.files_processed, 2);
        assert_eq!(probe.extract_calls(), 2);
        assert_eq!(fs::read(temp_dir.path().join("sub").join("two.txt")).unwrap(), b"two");
    }

    #[test]
    fn test_existing_empty_output_is_retried() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"").unwrap();
        let mut probe = MemoryProbe::new();
        probe.add_file("/src/a.txt", "fresh");

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/a.txt"]))
            .unwrap();

        assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"fresh");
    }

    #[test]
    fn test_probe_failure_leaves_partial_output() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe
            .add_failing_file("/src/broken.db", "PART")
            .add_file("/src/fine.txt", "ok");

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/broken.db", "/src/fine.txt"]))
            .unwrap();

        let target = temp_dir.path().join("broken.db");
        assert!(!target.exists());
        assert_eq!(fs::read(partial_path(&target)).unwrap(), b"PART");
        assert_eq!(report.stats.recover_errors, 1);
        assert_eq!(report.stats.files_recovered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0.as_str(), "/src/broken.db");
        assert!(report.failures[0].1.contains("exited with status 1"));
    }

    #[test]
    fn test_staging_suffix_name_never_clobbers_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/foo.salvage-partial", "REAL FILE")
            .add_file("/src/foo", "foo content");

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/foo.salvage-partial", "/src/foo"]))
            .unwrap();

        assert_eq!(fs::read(temp_dir.path().join("foo")).unwrap(), b"foo content");
        assert!(!temp_dir.path().join("foo.salvage-partial").exists());
        assert_eq!(report.stats.files_recovered, 1);
        assert_eq!(report.stats.recover_errors, 1);
        assert_eq!(report.failures[0].0.as_str(), "/src/foo.salvage-partial");
        assert!(report.failures[0].1.contains("reserved"));
        assert_eq!(probe.extract_calls(), 1);
    }

    #[test]
    fn test_leftover_partial_is_not_taken_for_a_recovered_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        probe
            .add_failing_file("/src/foo", "GARBAGE")
            .add_file("/src/foo.salvage-partial", "REAL FILE");

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/foo", "/src/foo.salvage-partial"]))
            .unwrap();

        assert_eq!(report.stats.files_skipped, 0);
        assert_eq!(report.stats.files_recovered, 0);
        assert_eq!(report.stats.recover_errors, 2);
        // Still only the evidence of the failed attempt
        assert_eq!(
            fs::read(temp_dir.path().join("foo.salvage-partial")).unwrap(),
            b"GARBAGE"
        );
    }

    #[test]
    fn test_item_outside_root_fails_without_probe_call() {
        let temp_dir = TempDir::new().unwrap();
        let probe = MemoryProbe::new();

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/elsewhere/a.txt", "/src/../etc/passwd"]))
            .unwrap();

        assert_eq!(report.stats.recover_errors, 2);
        assert_eq!(probe.extract_calls(), 0);
    }

    #[test]
    fn test_output_write_failure_is_an_item_error() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the output directory should go
        fs::write(temp_dir.path().join("blocked"), b"x").unwrap();
        let mut probe = MemoryProbe::new();
        probe
            .add_file("/src/blocked/a.txt", "a")
            .add_file("/src/b.txt", "b");

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/blocked/a.txt", "/src/b.txt"]))
            .unwrap();

        assert_eq!(report.stats.recover_errors, 1);
        assert_eq!(report.stats.files_recovered, 1);
        assert_eq!(fs::read(temp_dir.path().join("blocked")).unwrap(), b"x");
    }

    /// A probe that cannot be launched
    struct MissingProbe;

    impl VolumeProbe for MissingProbe {
        fn list(&self, _volume: &VolumeHandle, _path: &str) -> std::result::Result<ListOutput, ProbeError> {
            Err(ProbeError::NotFound("probe-list".into()))
        }

        fn extract(
            &self,
            _volume: &VolumeHandle,
            _path: &str,
            _sink: &mut dyn Write,
        ) -> std::result::Result<ProbeStatus, ProbeError> {
            Err(ProbeError::NotFound("probe-recover".into()))
        }
    }

    #[test]
    fn test_missing_probe_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let result = RecoveryExecutor::new(&MissingProbe, &volume, "/src", &options, &NoProgress)
            .run(&items(&["/src/a.txt"]));

        assert!(matches!(
            result,
            Err(crate::SalvageError::Probe(ProbeError::NotFound(_)))
        ));
    }

    #[test]
    fn test_parallel_workers_recover_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut probe = MemoryProbe::new();
        let mut paths = Vec::new();
        for dir in 0..5 {
            for file in 0..20 {
                let path = format!("/src/d{}/f{}.txt", dir, file);
                probe.add_file(&path, format!("content {} {}", dir, file));
                paths.push(WorkItem::new(path));
            }
        }
        // A duplicate entry must not produce a second write
        paths.push(WorkItem::new("/src/d0/f0.txt"));

        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path()).with_workers(4);
        let report = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress)
            .run(&paths)
            .unwrap();

        assert_eq!(report.stats.files_processed, 101);
        assert_eq!(report.stats.files_recovered, 100);
        assert_eq!(report.stats.files_skipped, 1);
        assert_eq!(report.stats.recover_errors, 0);
        assert_eq!(
            fs::read(temp_dir.path().join("d3").join("f7.txt")).unwrap(),
            b"content 3 7"
        );
    }

    #[test]
    fn test_mirror_directories_creates_empty_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let probe = MemoryProbe::new();
        let volume = volume();
        let options = RecoverOptions::new(temp_dir.path());
        let executor = RecoveryExecutor::new(&probe, &volume, "/src", &options, &NoProgress);

        executor.mirror_directories(&["/src".to_string(), "/src/empty/nested".to_string()]);
        assert!(temp_dir.path().join("empty").join("nested").is_dir());
    }
}
