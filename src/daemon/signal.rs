//! Control signals: the `-s` vocabulary, OS signal mapping and delivery.

use std::fmt;

use clap::ValueEnum;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::DaemonError;

/// Command accepted by `-s` and forwarded to the running daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalCommand {
    /// Graceful shutdown: wait for the current cycle to finish
    Quit,
    /// Fast shutdown
    Stop,
    /// Reload the configuration
    Reload,
}

impl SignalCommand {
    pub fn os_signal(self) -> Signal {
        match self {
            SignalCommand::Quit => Signal::SIGQUIT,
            SignalCommand::Stop => Signal::SIGTERM,
            SignalCommand::Reload => Signal::SIGHUP,
        }
    }
}

/// Signal as seen by the daemon's lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Quit,
    Stop,
    Reload,
}

impl From<SignalCommand> for LifecycleSignal {
    fn from(command: SignalCommand) -> Self {
        match command {
            SignalCommand::Quit => LifecycleSignal::Quit,
            SignalCommand::Stop => LifecycleSignal::Stop,
            SignalCommand::Reload => LifecycleSignal::Reload,
        }
    }
}

impl fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleSignal::Quit => write!(f, "QUIT"),
            LifecycleSignal::Stop => write!(f, "STOP"),
            LifecycleSignal::Reload => write!(f, "RELOAD"),
        }
    }
}

/// Deliver a control command to a running daemon.
pub fn send_signal_to_pid(pid: u32, command: SignalCommand) -> Result<(), DaemonError> {
    let os_signal = command.os_signal();
    let delivery_error = |reason: String| DaemonError::SignalDelivery {
        pid,
        signal: os_signal.to_string(),
        reason,
    };

    let raw = i32::try_from(pid).map_err(|e| delivery_error(e.to_string()))?;
    kill(Pid::from_raw(raw), os_signal).map_err(|e| delivery_error(e.to_string()))?;

    debug!("Sent {} to PID {}", os_signal, pid);
    Ok(())
}

/// Install SIGQUIT, SIGTERM and SIGHUP handlers and funnel them into one
/// channel. Must be called inside a tokio runtime.
pub fn pump_os_signals() -> Result<mpsc::Receiver<LifecycleSignal>, DaemonError> {
    let (tx, rx) = mpsc::channel(16);

    let handlers = [
        (SignalKind::quit(), LifecycleSignal::Quit),
        (SignalKind::terminate(), LifecycleSignal::Stop),
        (SignalKind::hangup(), LifecycleSignal::Reload),
    ];

    for (kind, lifecycle_signal) in handlers {
        let mut stream = signal(kind).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                debug!("Received {}", lifecycle_signal);
                if tx.send(lifecycle_signal).await.is_err() {
                    break;
                }
            }
        });
    }

    info!("OS signal handlers installed (SIGQUIT, SIGTERM, SIGHUP)");
    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_to_os_signal() {
        assert_eq!(SignalCommand::Quit.os_signal(), Signal::SIGQUIT);
        assert_eq!(SignalCommand::Stop.os_signal(), Signal::SIGTERM);
        assert_eq!(SignalCommand::Reload.os_signal(), Signal::SIGHUP);
    }

    #[test]
    fn test_command_to_lifecycle_signal() {
        assert_eq!(LifecycleSignal::from(SignalCommand::Quit), LifecycleSignal::Quit);
        assert_eq!(LifecycleSignal::from(SignalCommand::Stop), LifecycleSignal::Stop);
        assert_eq!(LifecycleSignal::from(SignalCommand::Reload), LifecycleSignal::Reload);
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(LifecycleSignal::Quit.to_string(), "QUIT");
        assert_eq!(LifecycleSignal::Reload.to_string(), "RELOAD");
    }

    #[test]
    fn test_send_to_dead_pid_fails() {
        let result = send_signal_to_pid(999_999_999, SignalCommand::Reload);
        assert!(matches!(result, Err(DaemonError::SignalDelivery { .. })));
    }

    #[tokio::test]
    async fn test_pump_delivers_hangup_as_reload() {
        let mut rx = pump_os_signals().unwrap();
        kill(Pid::this(), Signal::SIGHUP).unwrap();
        assert_eq!(rx.recv().await, Some(LifecycleSignal::Reload));
    }

    #[tokio::test]
    async fn test_delivery_leaves_operator_message_to_caller() {
        let mut rx = pump_os_signals().unwrap();
        let (logs, _guard) = crate::daemon::log_capture::LogBuffer::install();

        send_signal_to_pid(std::process::id(), SignalCommand::Reload).unwrap();

        assert_eq!(rx.recv().await, Some(LifecycleSignal::Reload));
        assert!(!logs.contents().contains("Sent"));
    }
}
