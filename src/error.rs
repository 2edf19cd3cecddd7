//! Error types shared by the collectors, renderers and the daemon.

use std::path::PathBuf;

use thiserror::Error;

use crate::daemon::lifecycle::LifecycleState;

/// Failure to collect one hardware category.
///
/// Carried inside the snapshot and rendered as an `ERROR` row; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("unable to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("no {0} information available on this host")]
    Unavailable(&'static str),
}

impl CollectError {
    pub fn unreadable(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CollectError::Unreadable {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Errors raised while running a collect+render cycle.
#[derive(Debug, Error)]
pub enum AppError {
    /// A process environment toggle could not be applied.
    #[error("failed to prepare environment: cannot set {key}={value}: {reason}")]
    Environment {
        key: String,
        value: String,
        reason: String,
    },

    #[error("failed to serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Environment failures end the process instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Environment { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Environment { .. } => 2,
            _ => 1,
        }
    }
}

/// Errors raised by daemon bootstrap, signal forwarding and shutdown.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("daemon already running (PID file: {}, PID: {pid})", path.display())]
    AlreadyRunning { path: PathBuf, pid: u32 },

    #[error("no running daemon found (PID file: {})", path.display())]
    NotRunning { path: PathBuf },

    #[error("failed to read PID file at {}: {reason}", path.display())]
    PidFileRead { path: PathBuf, reason: String },

    #[error("failed to create PID file at {}: {reason}", path.display())]
    PidFileCreation { path: PathBuf, reason: String },

    #[error("failed to remove PID file at {}: {reason}", path.display())]
    PidFileRemoval { path: PathBuf, reason: String },

    #[error("failed to open log file at {}: {reason}", path.display())]
    LogFile { path: PathBuf, reason: String },

    #[error("failed to detach from terminal: {0}")]
    Detach(String),

    #[error("failed to set up signal handlers: {0}")]
    SignalSetup(String),

    #[error("failed to send {signal} to PID {pid}: {reason}")]
    SignalDelivery {
        pid: u32,
        signal: String,
        reason: String,
    },

    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("failed to build async runtime: {0}")]
    Runtime(String),

    #[error("sampling loop failed: {0}")]
    Sampling(#[from] AppError),
}

impl DaemonError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DaemonError::Sampling(e) => e.exit_code(),
            _ => 1,
        }
    }
}
