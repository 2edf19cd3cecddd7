mod cli;
mod commands;
mod daemon;
mod error;
mod hardware;
mod output;
mod render;

use clap::{CommandFactory, Parser};
use cli::{Cli, Mode, RunConfig};
use commands::{handle_daemon_command, handle_inventory_command};
use output::print_error;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Log to stderr; the daemon's stderr is its log file, so no colours there.
fn init_tracing(ansi: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = RunConfig::from(&cli);
    let mode = config.mode();
    init_tracing(mode != Mode::Daemon);

    let exit_code = match mode {
        Mode::Daemon => match handle_daemon_command(&config) {
            Ok(()) => 0,
            Err(e) => {
                error!("{}", e);
                print_error(&e.to_string());
                e.exit_code()
            }
        },
        Mode::OneShot(format) => match handle_inventory_command(format) {
            Ok(()) => 0,
            Err(e) => {
                print_error(&e.to_string());
                e.exit_code()
            }
        },
        Mode::Usage => match Cli::command().print_help() {
            Ok(()) => 0,
            Err(e) => {
                print_error(&e.to_string());
                1
            }
        },
    };

    std::process::exit(exit_code);
}
