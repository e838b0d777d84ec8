//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `rsync-scout scan <target>...` - Probe rsync daemons
//! - `rsync-scout history` - View or prune past scans
//! - `rsync-scout export <scan-id>` - Export a stored scan

mod export;
mod history;
mod scan;

pub use export::ExportCommand;
pub use history::HistoryCommand;
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rsync-scout - unauthenticated rsync daemon reconnaissance.
///
/// Connects to rsync daemons, completes the version handshake, records the
/// message of the day, lists exported modules and checks which of them can
/// be accessed without credentials.
#[derive(Parser, Debug)]
#[command(name = "rsync-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List rsync modules and check anonymous access", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target to scan (legacy mode, use 'rsync-scout scan' instead)
    #[arg(value_name = "TARGET", hide = true)]
    pub legacy_target: Option<String>,
}

impl Cli {
    /// Load settings from `--config` or the default location.
    pub fn settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }

    /// Run the selected command.
    pub async fn execute(self) -> CliResult<()> {
        let settings = self.settings()?;
        let verbose = self.verbose || settings.verbose;

        match self.command {
            Some(Commands::Scan(cmd)) => cmd.execute(&settings, verbose, self.quiet).await,
            Some(Commands::History(cmd)) => cmd.execute(verbose, self.quiet),
            Some(Commands::Export(cmd)) => cmd.execute(verbose, self.quiet),
            None => match self.legacy_target {
                Some(target) => {
                    ScanCommand::for_target(target)
                        .execute(&settings, verbose, self.quiet)
                        .await
                }
                None => Err(CliError::Other(
                    "no target given; try 'rsync-scout scan <TARGET>'".to_string(),
                )),
            },
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe rsync daemons for modules and anonymous access
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View scan history
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Export a stored scan
    #[command(alias = "e")]
    Export(ExportCommand),
}

impl Commands {
    /// Subcommand name, for error context.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "scan",
            Self::History(_) => "history",
            Self::Export(_) => "export",
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_subcommand() {
        let cli = Cli::try_parse_from([
            "rsync-scout",
            "scan",
            "192.0.2.10",
            "192.0.2.0/30",
            "-p",
            "8873",
            "-o",
            "json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Scan(cmd)) => {
                assert_eq!(cmd.targets, vec!["192.0.2.10", "192.0.2.0/30"]);
                assert_eq!(cmd.port, Some(8873));
                assert_eq!(cmd.output, Some(OutputFormat::Json));
            }
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_target() {
        let cli = Cli::try_parse_from(["rsync-scout", "192.0.2.10"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.legacy_target.as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
