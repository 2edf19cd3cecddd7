// Daemon mode: detachment, PID file, control signals, sampling loop
pub mod context;
pub mod lifecycle;
#[cfg(test)]
pub mod log_capture;
pub mod pid;
pub mod sampler;
pub mod settings;
pub mod signal;

pub use context::{DaemonContext, Detached};
pub use lifecycle::run_daemon;
pub use sampler::{Cycle, LoopExit};
pub use settings::DaemonSettings;
