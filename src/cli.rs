use clap::Parser;

use crate::daemon::signal::SignalCommand;
use crate::render::FormatSelector;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "hardware-inventory")]
#[command(about = "Report CPU, memory, block storage and network inventory of this host")]
pub struct Cli {
    /// Output format (json, csv, std)
    #[arg(short = 'f', value_name = "FORMAT")]
    pub format: Option<String>,

    /// Run as a background daemon that re-samples every hour
    #[arg(short = 'd')]
    pub daemon: bool,

    /// Send a signal to the running daemon: quit (graceful shutdown),
    /// stop (fast shutdown), reload (reload the configuration)
    #[arg(short = 's', value_enum, value_name = "SIGNAL", requires = "daemon")]
    pub signal: Option<SignalCommand>,
}

/// Immutable run configuration built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub format: Option<FormatSelector>,
    pub daemon: bool,
    pub signal: Option<SignalCommand>,
}

/// The single mode a run resolves to.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    Daemon,
    OneShot(&'a FormatSelector),
    Usage,
}

impl From<&Cli> for RunConfig {
    fn from(cli: &Cli) -> Self {
        RunConfig {
            format: cli.format.as_deref().and_then(FormatSelector::parse),
            daemon: cli.daemon,
            signal: cli.signal,
        }
    }
}

impl RunConfig {
    pub fn mode(&self) -> Mode<'_> {
        if self.daemon {
            return Mode::Daemon;
        }
        match &self.format {
            Some(format) => Mode::OneShot(format),
            None => Mode::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(args: &[&str]) -> RunConfig {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        RunConfig::from(&cli)
    }

    #[test]
    fn test_no_flags_prints_usage() {
        let config = config_from(&["hardware-inventory"]);
        assert_eq!(config.mode(), Mode::Usage);
    }

    #[test]
    fn test_empty_format_is_treated_as_omitted() {
        let config = config_from(&["hardware-inventory", "-f", ""]);
        assert_eq!(config.format, None);
        assert_eq!(config.mode(), Mode::Usage);
    }

    #[test]
    fn test_format_selects_one_shot() {
        let config = config_from(&["hardware-inventory", "-f", "csv"]);
        assert_eq!(config.mode(), Mode::OneShot(&FormatSelector::Csv));
    }

    #[test]
    fn test_unknown_format_still_one_shot() {
        let config = config_from(&["hardware-inventory", "-f", "JSON"]);
        assert_eq!(
            config.mode(),
            Mode::OneShot(&FormatSelector::Unsupported("JSON".to_string()))
        );
    }

    #[test]
    fn test_daemon_flag_wins_over_format() {
        let config = config_from(&["hardware-inventory", "-d", "-f", "std"]);
        assert_eq!(config.mode(), Mode::Daemon);
        assert_eq!(config.format, Some(FormatSelector::Std));
    }

    #[test]
    fn test_signal_parses_with_daemon() {
        let config = config_from(&["hardware-inventory", "-d", "-s", "reload"]);
        assert_eq!(config.signal, Some(SignalCommand::Reload));
    }

    #[test]
    fn test_signal_requires_daemon() {
        assert!(Cli::try_parse_from(["hardware-inventory", "-s", "quit"]).is_err());
    }

    #[test]
    fn test_unknown_signal_rejected() {
        assert!(Cli::try_parse_from(["hardware-inventory", "-d", "-s", "kill"]).is_err());
    }
}
