//! Error types for salvage
//!
//! Three layers, from most to least severe:
//! - `ProbeError`: a probe could not be started at all (fatal), or a pipe to a
//!   running probe broke (local to one invocation)
//! - `ItemError`: one WorkItem could not be recovered; counted, never fatal
//! - `SalvageError`: the run itself cannot continue

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::probe::ProbeStatus;

/// Errors raised while invoking an external probe
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Program name could not be resolved on PATH or at the given location
    #[error("probe `{0}` was not found")]
    NotFound(String),

    /// Program exists but cannot be executed
    #[error("probe `{}` is not an executable file", .0.display())]
    NotExecutable(PathBuf),

    /// Spawning the probe process failed
    #[error("probe `{}` could not be launched: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing through a running probe failed
    #[error("probe I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl ProbeError {
    /// Whether the run must abort. Only failures to start a probe qualify;
    /// everything else is scoped to the single invocation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProbeError::Io(_))
    }
}

/// Per-item recovery failure
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("extraction probe {0}")]
    Probe(ProbeStatus),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("`{0}` is not under the source root")]
    OutsideRoot(String),

    #[error("`{0}` contains a `.` or `..` component")]
    UnsafePath(String),

    /// Output name would collide with the staging file of a sibling
    #[error("`{0}` ends in the reserved staging suffix")]
    ReservedName(String),
}

/// Run-level errors
#[derive(Error, Debug)]
pub enum SalvageError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = SalvageError> = std::result::Result<T, E>;
