//! Subprocess-backed probes

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{ListOutput, ProbeStatus, VolumeProbe};
use crate::error::ProbeError;
use crate::VolumeHandle;

pub const DEFAULT_LIST_PROGRAM: &str = "probe-list";
pub const DEFAULT_RECOVER_PROGRAM: &str = "probe-recover";

/// How often a child with a deadline is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs the listing and extraction probes as child processes
#[derive(Debug, Clone)]
pub struct CommandProbe {
    list_program: PathBuf,
    recover_program: PathBuf,
    timeout: Option<Duration>,
}

impl CommandProbe {
    /// Resolve both programs up front so a missing probe aborts the run
    /// before any scanning starts.
    pub fn locate(
        list_program: impl AsRef<OsStr>,
        recover_program: impl AsRef<OsStr>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProbeError> {
        let list_program = resolve_program(list_program.as_ref())?;
        let recover_program = resolve_program(recover_program.as_ref())?;
        debug!(
            "Using probes {} and {}",
            list_program.display(),
            recover_program.display()
        );
        Ok(Self {
            list_program,
            recover_program,
            timeout,
        })
    }

    pub fn list_program(&self) -> &Path {
        &self.list_program
    }

    pub fn recover_program(&self) -> &Path {
        &self.recover_program
    }

    fn command(&self, program: &Path, volume: &VolumeHandle, path: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg(&volume.device)
            .arg(volume.index.to_string())
            .arg(path)
            .stdin(Stdio::null());
        cmd
    }

    fn spawn(&self, mut cmd: Command, program: &Path) -> Result<Child, ProbeError> {
        cmd.spawn().map_err(|source| ProbeError::Launch {
            program: program.to_path_buf(),
            source,
        })
    }
}

impl VolumeProbe for CommandProbe {
    fn list(&self, volume: &VolumeHandle, path: &str) -> Result<ListOutput, ProbeError> {
        let mut cmd = self.command(&self.list_program, volume, path);
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        let mut child = self.spawn(cmd, &self.list_program)?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "listing probe stderr not captured"))?;

        let timeout = self.timeout;
        let (status, raw) = thread::scope(|scope| {
            let reader = scope.spawn(move || {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).map(|_| buf)
            });
            let status = wait_with_deadline(&mut child, timeout);
            let raw = reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stderr reader panicked")));
            (status, raw)
        });

        Ok(ListOutput {
            status: status?,
            diagnostics: String::from_utf8_lossy(&raw?).into_owned(),
        })
    }

    fn extract(
        &self,
        volume: &VolumeHandle,
        path: &str,
        sink: &mut dyn Write,
    ) -> Result<ProbeStatus, ProbeError> {
        let mut cmd = self.command(&self.recover_program, volume, path);
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());
        let mut child = self.spawn(cmd, &self.recover_program)?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "extraction probe stdout not captured"))?;

        let timeout = self.timeout;
        let (status, copied) = thread::scope(|scope| {
            let waiter = scope.spawn(|| wait_with_deadline(&mut child, timeout));
            let copied = copy_to_sink(&mut stdout, sink);
            // Closing the pipe unblocks a probe stuck on a full pipe after
            // the sink failed.
            drop(stdout);
            let status = waiter
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "probe waiter panicked")));
            (status, copied)
        });

        let status = status?;
        match copied {
            Ok(bytes) => {
                debug!("Extracted {} bytes for {} ({})", bytes, path, status);
                Ok(status)
            }
            // The probe usually dies of SIGPIPE once the sink gives up, so
            // the write error is the real cause.
            Err(CopyError::Sink(e)) => Err(ProbeError::Io(e)),
            // A killed probe closes its pipe mid-copy; the timeout is the
            // interesting part.
            Err(CopyError::Pipe(e)) if !status.is_success() => {
                debug!("Copy interrupted for {}: {}", path, e);
                Ok(status)
            }
            Err(CopyError::Pipe(e)) => Err(ProbeError::Io(e)),
        }
    }
}

/// Which side of a copy failed
#[derive(Debug)]
enum CopyError {
    Pipe(io::Error),
    Sink(io::Error),
}

fn copy_to_sink(reader: &mut impl Read, sink: &mut dyn Write) -> Result<u64, CopyError> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Pipe(e)),
        };
        sink.write_all(&buf[..n]).map_err(CopyError::Sink)?;
        total += n as u64;
    }
    sink.flush().map_err(CopyError::Sink)?;
    Ok(total)
}

/// Wait for `child`, killing it once `timeout` elapses
fn wait_with_deadline(child: &mut Child, timeout: Option<Duration>) -> io::Result<ProbeStatus> {
    let Some(timeout) = timeout else {
        return child.wait().map(status_of);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status_of(status));
        }
        if started.elapsed() >= timeout {
            warn!("Probe pid {} exceeded {:?}, killing it", child.id(), timeout);
            // The child may exit between try_wait and kill
            if let Err(e) = child.kill() {
                if e.kind() != io::ErrorKind::InvalidInput {
                    return Err(e);
                }
            }
            child.wait()?;
            return Ok(ProbeStatus::TimedOut { after: timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn status_of(status: ExitStatus) -> ProbeStatus {
    if status.success() {
        ProbeStatus::Success
    } else {
        ProbeStatus::Failed {
            code: status.code(),
        }
    }
}

/// Resolve a program name the way a shell would: paths are taken as given,
/// bare names are searched on `PATH`.
fn resolve_program(program: &OsStr) -> Result<PathBuf, ProbeError> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return check_executable(candidate);
    }

    let search = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search) {
        let full = dir.join(candidate);
        if full.is_file() {
            return check_executable(&full);
        }
    }
    Err(ProbeError::NotFound(candidate.display().to_string()))
}

fn check_executable(path: &Path) -> Result<PathBuf, ProbeError> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| ProbeError::NotFound(path.display().to_string()))?;
    if !metadata.is_file() {
        return Err(ProbeError::NotExecutable(path.to_path_buf()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ProbeError::NotExecutable(path.to_path_buf()));
        }
    }

    Ok(path.to_path_buf())
}
