//! Export subcommand implementation.
//!
//! Handles the `rsync-scout export <scan-id>` command for exporting stored scans.

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::{ScanRecord, ScanStore};
use crate::types::ScanId;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Export a stored scan.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Scan ID or prefix to export
    ///
    /// Can be a full UUID or the first few characters (short ID).
    #[arg(value_name = "SCAN_ID")]
    pub scan_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,

    /// Export only endpoints confirmed as rsync
    #[arg(long)]
    pub rsync_only: bool,
}

impl ExportCommand {
    /// Execute the export command.
    pub fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        let store = ScanStore::new()?;

        let mut record = if self.scan_id.len() < 36 {
            store.find_by_prefix(&self.scan_id)?
        } else {
            let id: ScanId = self.scan_id.parse()?;
            store.load(&id)?
        };

        if self.rsync_only {
            record.hosts.retain(|h| h.result().is_some());
        }

        let content = render(&record, self.format)?;

        if let Some(ref path) = self.output_file {
            fs::write(path, &content)
                .map_err(|e| CliError::Other(format!("failed to write file: {}", e)))?;

            if !quiet {
                output::print_success(&format!(
                    "Exported scan {} to {}",
                    record.id.short(),
                    path.display()
                ));
            }
        } else {
            println!("{}", content);
        }

        Ok(())
    }
}

/// Render a stored scan in `format`.
fn render(record: &ScanRecord, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(record).map_err(|e| CliError::Other(e.to_string()))
        }
        OutputFormat::Csv => {
            output::render_csv(record).map_err(|e| CliError::Other(e.to_string()))
        }
        OutputFormat::Plain => Ok(output::render_plain(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_round_trips() {
        let record = ScanRecord::new(vec!["192.0.2.1".into()]);
        let json = render(&record, OutputFormat::Json).unwrap();
        let parsed: ScanRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, record.id);
    }

    #[test]
    fn test_render_csv_has_header() {
        let record = ScanRecord::new(vec!["192.0.2.1".into()]);
        let csv = render(&record, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("host,port,status,version"));
    }
}
