//! Entry Lister: one directory listing through the listing probe

use tracing::{debug, trace, warn};

use crate::error::ProbeError;
use crate::probe::{parse_line, ListingLine, VolumeProbe};
use crate::stats::RunStats;
use crate::{EntryKind, VolumeHandle};

/// Child names of one directory, in the order the probe reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

pub struct EntryLister<'a> {
    probe: &'a dyn VolumeProbe,
    volume: &'a VolumeHandle,
    stats: &'a RunStats,
}

impl<'a> EntryLister<'a> {
    pub fn new(probe: &'a dyn VolumeProbe, volume: &'a VolumeHandle, stats: &'a RunStats) -> Self {
        Self {
            probe,
            volume,
            stats,
        }
    }

    /// List `path`. A failed listing is counted and yields an empty
    /// `Listing`; only a probe that cannot be started is an error.
    pub fn list(&self, path: &str) -> Result<Listing, ProbeError> {
        self.stats.record_listing();

        let output = match self.probe.list(self.volume, path) {
            Ok(output) => output,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.stats.record_list_error();
                warn!(
                    "Listing failed: {} {} {}: {}",
                    self.volume.device, self.volume.index, path, e
                );
                return Ok(Listing::default());
            }
        };

        if !output.status.is_success() {
            self.stats.record_list_error();
            warn!(
                "Listing failed: {} {} {} {}",
                self.volume.device, self.volume.index, path, output.status
            );
            return Ok(Listing::default());
        }

        let mut listing = Listing::default();
        for line in output.diagnostics.lines() {
            match parse_line(line) {
                ListingLine::Record(entry) => match entry.kind {
                    EntryKind::Directory => listing.dirs.push(entry.name),
                    EntryKind::File => listing.files.push(entry.name),
                },
                ListingLine::Malformed { reason } => {
                    debug!("Skipping malformed record in {} ({}): {}", path, reason, line);
                }
                ListingLine::Ignored => {}
            }
        }

        trace!(
            "Listed {}: {} dirs, {} files",
            path,
            listing.dirs.len(),
            listing.files.len()
        );
        Ok(listing)
    }
}
