//! The two external probes that are the only way into the volume
//!
//! - listing: `probe-list <device> <index> <path>`, directory records on stderr
//! - extraction: `probe-recover <device> <index> <path>`, raw content on stdout

pub mod command;
pub mod memory;
pub mod record;

use std::io::Write;
use std::time::Duration;

use crate::error::ProbeError;
use crate::VolumeHandle;

pub use command::CommandProbe;
pub use memory::MemoryProbe;
pub use record::{parse_line, ListingLine};

/// How a probe invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Success,
    /// Non-zero exit, or killed by a signal (`code` is `None`)
    Failed { code: Option<i32> },
    /// Killed after exceeding the per-invocation timeout
    TimedOut { after: Duration },
}

impl ProbeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeStatus::Success)
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Success => write!(f, "succeeded"),
            ProbeStatus::Failed { code: Some(code) } => write!(f, "exited with status {}", code),
            ProbeStatus::Failed { code: None } => write!(f, "was terminated by a signal"),
            ProbeStatus::TimedOut { after } => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
        }
    }
}

/// Result of one listing invocation
#[derive(Debug, Clone)]
pub struct ListOutput {
    pub status: ProbeStatus,
    /// Everything the probe wrote to its diagnostic stream
    pub diagnostics: String,
}

/// Read access to a volume
pub trait VolumeProbe: Send + Sync {
    /// List one directory. Returning `Err` is reserved for failures to run
    /// the probe; a probe that ran and failed reports it through `status`.
    fn list(&self, volume: &VolumeHandle, path: &str) -> Result<ListOutput, ProbeError>;

    /// Stream the content of one file into `sink`
    fn extract(
        &self,
        volume: &VolumeHandle,
        path: &str,
        sink: &mut dyn Write,
    ) -> Result<ProbeStatus, ProbeError>;
}
