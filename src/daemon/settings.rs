//! Fixed daemon bookkeeping: file names, permissions and timings.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PID_FILE_NAME: &str = "hardware-inventory.pid";
pub const LOG_FILE_NAME: &str = "hardware-inventory.log";

/// Daemon process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    /// Directory the daemon changes into; PID and log files live here.
    pub work_dir: PathBuf,
    pub pid_file_name: String,
    pub pid_file_mode: u32,
    pub log_file_name: String,
    pub log_file_mode: u32,
    pub umask: u32,
    /// Pause between two sampling cycles.
    pub sample_interval: Duration,
    /// Upper bound a graceful quit waits for the sampling loop.
    pub shutdown_timeout: Duration,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./"),
            pid_file_name: PID_FILE_NAME.to_string(),
            pid_file_mode: 0o644,
            log_file_name: LOG_FILE_NAME.to_string(),
            log_file_mode: 0o640,
            umask: 0o027,
            sample_interval: Duration::from_secs(60 * 60),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl DaemonSettings {
    /// Settings rooted at another directory.
    #[cfg(test)]
    pub fn in_dir<P: AsRef<Path>>(work_dir: P) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn pid_file_path(&self) -> PathBuf {
        self.work_dir.join(&self.pid_file_name)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.work_dir.join(&self.log_file_name)
    }
}
