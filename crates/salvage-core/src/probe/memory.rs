//! In-memory volume for tests and dry runs
//!
//! Listings are rendered in the listing probe's own line format, so the
//! record parser sees exactly what it would see from the real probe.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::record::format_record;
use super::{ListOutput, ProbeStatus, VolumeProbe};
use crate::error::ProbeError;
use crate::mirror::{join_volume_path, normalize_volume_path};
use crate::{DirEntry, EntryKind, VolumeHandle};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    status: ProbeStatus,
}

/// A fake volume. Directories are created implicitly by adding files or
/// directories beneath them.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    children: HashMap<String, Vec<DirEntry>>,
    files: HashMap<String, MemoryFile>,
    failing_dirs: HashSet<String>,
    list_calls: AtomicU64,
    extract_calls: AtomicU64,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        self.ensure_dir(&normalize_volume_path(path));
        self
    }

    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> &mut Self {
        self.insert_file(path, content.into(), ProbeStatus::Success)
    }

    /// A file whose extraction produces `partial` and then fails
    pub fn add_failing_file(&mut self, path: &str, partial: impl Into<Vec<u8>>) -> &mut Self {
        self.insert_file(path, partial.into(), ProbeStatus::Failed { code: Some(1) })
    }

    /// Listing this directory exits non-zero
    pub fn fail_listing(&mut self, path: &str) -> &mut Self {
        self.failing_dirs.insert(normalize_volume_path(path));
        self
    }

    /// Append a child record to `parent` with `name` taken verbatim, for
    /// listings that report names no real path could have.
    pub fn add_entry(&mut self, parent: &str, name: &str, kind: EntryKind) -> &mut Self {
        let parent = normalize_volume_path(parent);
        self.ensure_dir(&parent);
        self.push_child(&parent, name, kind);
        self
    }

    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    pub fn extract_calls(&self) -> u64 {
        self.extract_calls.load(Ordering::Relaxed)
    }

    fn insert_file(&mut self, path: &str, content: Vec<u8>, status: ProbeStatus) -> &mut Self {
        let path = normalize_volume_path(path);
        let (parent, name) = split_parent(&path);
        self.ensure_dir(&parent);
        self.push_child(&parent, name, EntryKind::File);
        self.files.insert(path, MemoryFile { content, status });
        self
    }

    fn ensure_dir(&mut self, path: &str) {
        if self.children.contains_key(path) {
            return;
        }
        self.children.insert(path.to_string(), Vec::new());
        if path != "/" {
            let (parent, name) = split_parent(path);
            self.ensure_dir(&parent);
            self.push_child(&parent, name, EntryKind::Directory);
        }
    }

    fn push_child(&mut self, parent: &str, name: &str, kind: EntryKind) {
        let entries = self.children.entry(parent.to_string()).or_default();
        if !entries.iter().any(|e| e.name == name) {
            entries.push(DirEntry {
                name: name.to_string(),
                kind,
            });
        }
    }
}

fn split_parent(path: &str) -> (String, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) => ("/".to_string(), name),
        Some((parent, name)) => (parent.to_string(), name),
        None => ("/".to_string(), path),
    }
}

impl VolumeProbe for MemoryProbe {
    fn list(&self, volume: &VolumeHandle, path: &str) -> Result<ListOutput, ProbeError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let path = normalize_volume_path(path);

        let mut diagnostics = format!("Opening file at `{}` in read-only mode ... OK.\n", volume.device);
        if self.failing_dirs.contains(&path) {
            diagnostics.push_str("ABORT: Could not find the file-system record.\n");
            return Ok(ListOutput {
                status: ProbeStatus::Failed { code: Some(255) },
                diagnostics,
            });
        }

        let Some(entries) = self.children.get(&path) else {
            diagnostics.push_str("ABORT: No such path.\n");
            return Ok(ListOutput {
                status: ProbeStatus::Failed { code: Some(255) },
                diagnostics,
            });
        };

        for (i, entry) in entries.iter().enumerate() {
            let size = match entry.kind {
                EntryKind::File => self
                    .files
                    .get(&join_volume_path(&path, &entry.name))
                    .map_or(0, |f| f.content.len() as u64),
                EntryKind::Directory => 0,
            };
            diagnostics.push_str(&format_record(entry, 0x1000 + i as u64, size));
            diagnostics.push('\n');
        }
        diagnostics.push_str("- DIR STATS\n\n");

        Ok(ListOutput {
            status: ProbeStatus::Success,
            diagnostics,
        })
    }

    fn extract(
        &self,
        _volume: &VolumeHandle,
        path: &str,
        sink: &mut dyn Write,
    ) -> Result<ProbeStatus, ProbeError> {
        self.extract_calls.fetch_add(1, Ordering::Relaxed);
        match self.files.get(&normalize_volume_path(path)) {
            Some(file) => {
                sink.write_all(&file.content)?;
                Ok(file.status)
            }
            None => Ok(ProbeStatus::Failed { code: Some(255) }),
        }
    }
}
