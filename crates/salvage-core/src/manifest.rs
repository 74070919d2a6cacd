//! Persisted scan results
//!
//! A scan is expensive and its result is reused by every recovery attempt,
//! so the ordered work list is saved as JSON next to the recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{Result, SalvageError};
use crate::stats::StatsSnapshot;
use crate::walker::{WalkOptions, WalkOutput};
use crate::{ExclusionSet, VolumeHandle, WorkItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanManifest {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub volume: VolumeHandle,
    pub source_root: String,
    pub exclusions: Vec<String>,
    pub ignore_names: Vec<String>,
    /// Directories reached during the scan, pruned ones excluded
    pub directories: Vec<String>,
    /// Files to recover, in traversal order
    pub items: Vec<WorkItem>,
    pub scan_stats: StatsSnapshot,
}

impl ScanManifest {
    pub fn new(
        volume: VolumeHandle,
        options: &WalkOptions,
        output: WalkOutput,
        scan_stats: StatsSnapshot,
    ) -> Self {
        let mut ignore_names: Vec<String> = options.ignore_names.iter().cloned().collect();
        ignore_names.sort();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            volume,
            source_root: options.root.clone(),
            exclusions: options.exclusions.to_vec(),
            ignore_names,
            directories: output.directories,
            items: output.items,
            scan_stats,
        }
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::new(&self.exclusions)
    }

    /// Write to `path` through a sibling temp file, so an interrupted save
    /// leaves any previous manifest intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let tmp = temp_path(path);
        let file = File::create(&tmp).map_err(|source| io_error(&tmp, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| SalvageError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(|source| io_error(&tmp, source))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| io_error(&tmp, source))?;
        drop(writer);

        fs::rename(&tmp, path).map_err(|source| io_error(path, source))?;
        tracing::info!(
            "Saved manifest {} ({} files, {} directories) to {}",
            self.id,
            self.items.len(),
            self.directories.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| io_error(path, source))?;
        let manifest: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| SalvageError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(
            "Loaded manifest {} from {} ({} files, scanned {})",
            manifest.id,
            path.display(),
            manifest.items.len(),
            manifest.created_at.to_rfc3339()
        );
        Ok(manifest)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> SalvageError {
    SalvageError::Io {
        path: path.to_path_buf(),
        source,
    }
}
