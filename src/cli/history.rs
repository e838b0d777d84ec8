//! History subcommand implementation.
//!
//! Handles the `rsync-scout history` command for viewing and pruning stored scans.

use crate::error::CliResult;
use crate::output;
use crate::storage::ScanStore;
use clap::Parser;
use console::style;

/// View and manage scan history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Show per-endpoint detail for each scan
    #[arg(short, long)]
    pub detailed: bool,

    /// Clear all scan history
    #[arg(long)]
    pub clear: bool,

    /// Delete one scan by ID or ID prefix
    #[arg(long, value_name = "SCAN_ID", conflicts_with = "clear")]
    pub delete: Option<String>,

    /// Delete scans older than N days
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        let store = ScanStore::new()?;
        self.run(&store, quiet)
    }

    fn run(&self, store: &ScanStore, quiet: bool) -> CliResult<()> {
        if let Some(prefix) = &self.delete {
            let record = store.find_by_prefix(prefix)?;
            store.delete(&record.id)?;
            if !quiet {
                output::print_success(&format!("Deleted scan {}", record.id.short()));
            }
            return Ok(());
        }

        if self.clear {
            let deleted = store.clear()?;
            if !quiet {
                output::print_success(&format!("Deleted {} scan(s)", deleted));
            }
            return Ok(());
        }

        if let Some(days) = self.prune {
            let deleted = store.cleanup(chrono::Duration::days(i64::from(days)))?;
            if !quiet {
                output::print_success(&format!(
                    "Pruned {} scan(s) older than {} days",
                    deleted, days
                ));
            }
            return Ok(());
        }

        let records = store.list_recent(self.count)?;
        if records.is_empty() {
            if !quiet {
                output::print_info("No scans recorded yet.");
            }
            return Ok(());
        }

        for record in &records {
            println!(
                "{}  {}  {}",
                style(record.id.short()).dim(),
                record.started_at.format("%Y-%m-%d %H:%M:%S"),
                record.summary()
            );

            if self.detailed {
                for host in &record.hosts {
                    let detail = match host.result() {
                        Some(result) => format!(
                            "rsync {} - {} module(s)",
                            result.version,
                            result.modules.len()
                        ),
                        None => "not rsync".to_string(),
                    };
                    println!("            {}  {}", host.target, style(detail).dim());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ScanRecord;

    fn command(args: &[&str]) -> HistoryCommand {
        let mut argv = vec!["history"];
        argv.extend_from_slice(args);
        HistoryCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_delete_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        let keep = ScanRecord::new(vec!["192.0.2.1".into()]);
        let stale = ScanRecord::new(vec!["192.0.2.2".into()]);
        store.save(&keep).unwrap();
        store.save(&stale).unwrap();

        let prefix = stale.id.short();
        command(&["--delete", prefix.as_str()])
            .run(&store, true)
            .unwrap();

        assert_eq!(store.list_ids().unwrap(), vec![keep.id]);
    }

    #[test]
    fn test_delete_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();

        assert!(command(&["--delete", "deadbeef"]).run(&store, true).is_err());
    }

    #[test]
    fn test_delete_conflicts_with_clear() {
        let parsed = HistoryCommand::try_parse_from(["history", "--clear", "--delete", "abc"]);
        assert!(parsed.is_err());
    }
}
