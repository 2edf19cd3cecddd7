use tracing::error;

use crate::cli::RunConfig;
use crate::commands::inventory::InventoryCycle;
use crate::daemon::{run_daemon, Cycle, DaemonContext, DaemonSettings, Detached, LoopExit};
use crate::error::DaemonError;
use crate::hardware::prepare_environment;
use crate::output::print_info;

/// `-d`: forward `-s` to the running daemon, or become the daemon.
pub fn handle_daemon_command(config: &RunConfig) -> Result<(), DaemonError> {
    let context = DaemonContext::new(DaemonSettings::default());

    if let Some(command) = config.signal {
        let pid = context.forward_signal(command)?;
        print_info(&format!(
            "Sent {} to daemon (PID {})",
            command.os_signal(),
            pid
        ));
        return Ok(());
    }

    let pid_file = match context.reborn()? {
        Detached::Parent => return Ok(()),
        Detached::Daemon(pid_file) => pid_file,
    };

    // Still single-threaded: the environment is pinned here, once, and the
    // loop's cycles only verify it.
    let cycle = InventoryCycle::pinned(config.format.clone());
    if let Err(e) = prepare_environment() {
        error!("{}", e);
        // Render once anyway; the cycle reports the same failure.
        let _ = cycle.run();
        drop(pid_file);
        return Err(DaemonError::Sampling(e));
    }

    // Built only after detaching: fork does not carry runtime threads over.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DaemonError::Runtime(e.to_string()))?;

    let exit = runtime.block_on(run_daemon(cycle, context.settings()));

    // A fast stop may leave a cycle running on the blocking pool.
    runtime.shutdown_background();
    drop(pid_file);

    match exit? {
        LoopExit::Stopped => Ok(()),
        LoopExit::Fatal(e) => Err(DaemonError::Sampling(e)),
    }
}
