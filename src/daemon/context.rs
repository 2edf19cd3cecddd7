//! Process roles: locating a running daemon, and becoming one.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use nix::sys::stat::{umask, Mode};
use nix::sys::wait::waitpid;
use nix::unistd::{chdir, dup2, fork, setsid, ForkResult};
use tracing::debug;

use crate::daemon::pid::PidFile;
use crate::daemon::settings::DaemonSettings;
use crate::daemon::signal::{send_signal_to_pid, SignalCommand};
use crate::error::DaemonError;

/// Which side of the detachment the caller ended up on.
#[derive(Debug)]
pub enum Detached {
    /// Calling process; it should exit 0.
    Parent,
    /// Detached daemon; owns the PID file until dropped.
    Daemon(PidFile),
}

pub struct DaemonContext {
    settings: DaemonSettings,
}

impl DaemonContext {
    pub fn new(settings: DaemonSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DaemonSettings {
        &self.settings
    }

    fn pid_file(&self) -> PidFile {
        PidFile::new(self.settings.pid_file_path(), self.settings.pid_file_mode)
    }

    /// PID of the running daemon. Never creates the PID file.
    pub fn search(&self) -> Result<u32, DaemonError> {
        let pid_file = self.pid_file();
        let not_running = || DaemonError::NotRunning {
            path: pid_file.path().to_path_buf(),
        };

        match pid_file.running_pid() {
            Ok(Some(pid)) => Ok(pid),
            Ok(None) => Err(not_running()),
            Err(e) => {
                debug!("Treating unreadable PID file as no daemon: {}", e);
                Err(not_running())
            }
        }
    }

    /// Forward a control command to the running daemon; returns its PID.
    pub fn forward_signal(&self, command: SignalCommand) -> Result<u32, DaemonError> {
        let pid = self.search()?;
        send_signal_to_pid(pid, command)?;
        Ok(pid)
    }

    /// Detach from the terminal and session.
    ///
    /// Must run before any runtime or extra thread exists. The calling
    /// process gets [`Detached::Parent`] once the intermediate child has
    /// exited; the grandchild gets [`Detached::Daemon`] with stdin on
    /// `/dev/null`, stdout and stderr on the log file, and its PID written.
    pub fn reborn(&self) -> Result<Detached, DaemonError> {
        let mut pid_file = self.pid_file();
        pid_file.ensure_not_running()?;

        let work_dir = self
            .settings
            .work_dir
            .canonicalize()
            .map_err(|e| DaemonError::Detach(format!("invalid work directory: {}", e)))?;
        let log_file = self.open_log_file()?;
        let mut pid_file = PidFile::new(
            work_dir.join(&self.settings.pid_file_name),
            self.settings.pid_file_mode,
        );

        // SAFETY: the process is single-threaded at this point.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                waitpid(child, None)
                    .map_err(|e| DaemonError::Detach(format!("waitpid failed: {}", e)))?;
                return Ok(Detached::Parent);
            }
            Ok(ForkResult::Child) => {}
            Err(e) => return Err(DaemonError::Detach(format!("fork failed: {}", e))),
        }

        setsid().map_err(|e| DaemonError::Detach(format!("setsid failed: {}", e)))?;

        // Second fork: the session leader exits so the daemon can never
        // reacquire a controlling terminal.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { .. }) => std::process::exit(0),
            Ok(ForkResult::Child) => {}
            Err(e) => return Err(DaemonError::Detach(format!("fork failed: {}", e))),
        }

        umask(Mode::from_bits_truncate(self.settings.umask));
        chdir(work_dir.as_path())
            .map_err(|e| DaemonError::Detach(format!("chdir failed: {}", e)))?;

        let dev_null = File::open("/dev/null")
            .map_err(|e| DaemonError::Detach(format!("failed to open /dev/null: {}", e)))?;
        redirect(dev_null.as_raw_fd(), 0)?;
        redirect(log_file.as_raw_fd(), 1)?;
        redirect(log_file.as_raw_fd(), 2)?;

        pid_file.write_pid()?;
        Ok(Detached::Daemon(pid_file))
    }

    fn open_log_file(&self) -> Result<File, DaemonError> {
        let path: PathBuf = self.settings.log_file_path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .mode(self.settings.log_file_mode)
            .open(&path)
            .map_err(|e| DaemonError::LogFile {
                path,
                reason: e.to_string(),
            })
    }
}

fn redirect(from: i32, to: i32) -> Result<(), DaemonError> {
    dup2(from, to)
        .map(|_| ())
        .map_err(|e| DaemonError::Detach(format!("dup2 onto fd {} failed: {}", to, e)))
}
