//! PID file management for the daemon process.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::error::DaemonError;

/// PID file holding the id of the single running daemon.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    mode: u32,
    locked: bool,
}

impl PidFile {
    pub fn new<P: AsRef<Path>>(path: P, mode: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode,
            locked: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the PID from the file; `None` if there is no file.
    pub fn read_pid(&self) -> Result<Option<u32>, DaemonError> {
        if !self.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| DaemonError::PidFileRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let pid = contents
            .trim()
            .parse::<u32>()
            .map_err(|e| DaemonError::PidFileRead {
                path: self.path.clone(),
                reason: format!("invalid PID format: {}", e),
            })?;

        Ok(Some(pid))
    }

    /// PID of the live process named by the file, if any.
    pub fn running_pid(&self) -> Result<Option<u32>, DaemonError> {
        Ok(self.read_pid()?.filter(|pid| is_process_running(*pid)))
    }

    pub fn write_pid(&mut self) -> Result<(), DaemonError> {
        self.write_pid_value(std::process::id())
    }

    pub fn write_pid_value(&mut self, pid: u32) -> Result<(), DaemonError> {
        let creation_error = |e: std::io::Error| DaemonError::PidFileCreation {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(self.mode)
            .open(&self.path)
            .map_err(creation_error)?;
        writeln!(file, "{}", pid).map_err(creation_error)?;

        self.locked = true;
        info!("PID file created: {} (PID: {})", self.path.display(), pid);
        Ok(())
    }

    pub fn remove(&mut self) -> Result<(), DaemonError> {
        if !self.exists() {
            self.locked = false;
            return Ok(());
        }

        fs::remove_file(&self.path).map_err(|e| DaemonError::PidFileRemoval {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        self.locked = false;
        debug!("PID file removed: {}", self.path.display());
        Ok(())
    }

    /// Fails if a live daemon owns the file. A file naming a dead process
    /// is stale and gets removed.
    pub fn ensure_not_running(&mut self) -> Result<(), DaemonError> {
        if let Some(existing) = self.read_pid()? {
            if is_process_running(existing) {
                return Err(DaemonError::AlreadyRunning {
                    path: self.path.clone(),
                    pid: existing,
                });
            }

            warn!(
                "Removing stale PID file (PID {} not running): {}",
                existing,
                self.path.display()
            );
            self.remove()?;
        }
        Ok(())
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if self.locked {
            if let Err(e) = self.remove() {
                warn!("Failed to remove PID file on drop: {}", e);
            }
        }
    }
}

/// Signal 0 delivers nothing, only checks the process exists.
pub fn is_process_running(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    kill(Pid::from_raw(raw), None).is_ok()
}
