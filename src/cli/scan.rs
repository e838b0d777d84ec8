//! Scan subcommand implementation.
//!
//! Handles the `rsync-scout scan <target>...` command.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::scanner::{emit_reports, run_scan, HostReport, RsyncScanner, ScanJobConfig};
use crate::storage::{ReportStore, Reporter, ScanRecord, ScanStore};
use crate::transport::TcpConnector;
use crate::types::{Port, ScanTarget, TargetSpec};
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::warn;

/// Probe rsync daemons for modules and anonymous access.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Targets to scan (IP, hostname, or CIDR notation)
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   mirror.example.org Hostname
    ///   192.168.1.0/24     CIDR range
    #[arg(value_name = "TARGET", required = true)]
    pub targets: Vec<String>,

    /// rsync daemon port [default: 873]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Read timeout in milliseconds for each protocol step [default: 10000]
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Connection timeout in milliseconds [default: 5000]
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Maximum number of endpoints scanned at once
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Don't save the scan to history
    #[arg(long)]
    pub no_save: bool,

    /// Don't record service and module notes
    #[arg(long)]
    pub no_report: bool,
}

impl ScanCommand {
    /// A scan of a single target with every other option left to settings.
    pub fn for_target(target: String) -> Self {
        Self {
            targets: vec![target],
            port: None,
            timeout: None,
            connect_timeout: None,
            concurrency: None,
            output: None,
            no_save: false,
            no_report: false,
        }
    }

    /// Execute the scan command.
    pub async fn execute(
        &self,
        settings: &AppSettings,
        verbose: bool,
        quiet: bool,
    ) -> CliResult<()> {
        let port = Port::try_from(self.port.unwrap_or(settings.default_port))?;
        let read_timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.read_timeout());
        let connect_timeout = self
            .connect_timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.connect_timeout());
        let concurrency = self.concurrency.unwrap_or(settings.concurrency);
        let format = match self.output {
            Some(format) => format,
            None => settings
                .default_output_format
                .parse()
                .map_err(CliError::Other)?,
        };
        let plain = format == OutputFormat::Plain;

        let mut targets: Vec<ScanTarget> = Vec::new();
        for spec in &self.targets {
            targets.extend(TargetSpec::parse(spec)?.resolve(port).await?);
        }

        if targets.is_empty() {
            return Err(CliError::Other("No valid targets resolved".to_string()));
        }

        if !quiet && plain {
            output::print_scan_header(&self.targets, targets.len());
        }

        let mut reporter: Option<Box<dyn Reporter>> =
            if self.no_report || !settings.report_results {
                None
            } else {
                Some(Box::new(ReportStore::new()?))
            };

        let scanner = RsyncScanner::new(TcpConnector::new(connect_timeout, read_timeout));
        let mut job = ScanJobConfig::new(targets).with_concurrency(concurrency);
        if verbose && plain {
            job = job.with_progress();
        }

        let record = ScanRecord::new(self.targets.clone());
        let start = Instant::now();

        let hosts = run_scan(&scanner, job, |report: &HostReport| {
            if let Some(reporter) = reporter.as_deref_mut() {
                if let Err(e) = emit_reports(reporter, report) {
                    warn!(endpoint = %report.target, error = %e, "failed to record report");
                }
            }
            if plain && !(quiet && report.result().is_none()) {
                output::print_host_report(report, verbose);
            }
        })
        .await;

        let record = record.finalize(hosts, start.elapsed().as_millis() as u64);

        if !self.no_save && settings.auto_save_scans {
            let store = ScanStore::new()?;
            store.save(&record)?;
        }

        if plain && quiet {
            return Ok(());
        }
        output::print_results(&record, format)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_target_defers_to_settings() {
        let cmd = ScanCommand::for_target("192.0.2.1".to_string());
        assert_eq!(cmd.targets, vec!["192.0.2.1"]);
        assert!(cmd.port.is_none());
        assert!(cmd.output.is_none());
        assert!(!cmd.no_save);
    }
}
