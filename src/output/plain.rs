//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{HostOutcome, HostReport};
use crate::storage::ScanRecord;
use crate::types::{Module, ScanResult, ScanTarget};
use console::style;
use std::fmt::Write as _;
use std::io::{self, Write};

const COLUMNS: [&str; 3] = ["Name", "Comment", "Authentication?"];

/// Render the module table for one endpoint.
///
/// ```text
/// rsync modules for 192.0.2.10:873
/// ================================
///
///   Name  Comment       Authentication?
///   ----  -------       ---------------
///   pub   Public files  false
/// ```
pub fn render_module_table(target: &ScanTarget, modules: &[Module]) -> String {
    let rows: Vec<[String; 3]> = modules
        .iter()
        .map(|m| [m.name.clone(), m.comment.clone(), m.requires_auth.to_string()])
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let title = format!("rsync modules for {}", target);
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out);

    let dashes = COLUMNS.map(|c| "-".repeat(c.len()));
    let _ = writeln!(out, "{}", format_row(&widths, COLUMNS));
    let _ = writeln!(
        out,
        "{}",
        format_row(&widths, [&dashes[0], &dashes[1], &dashes[2]])
    );
    for row in &rows {
        let _ = writeln!(out, "{}", format_row(&widths, [&row[0], &row[1], &row[2]]));
    }

    out
}

fn format_row(widths: &[usize; 3], cells: [&str; 3]) -> String {
    let line = format!(
        "  {:<w0$}  {:<w1$}  {}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1]
    );
    line.trim_end().to_string()
}

/// Print the outcome for one endpoint as soon as it is known.
pub fn print_host_report(report: &HostReport, verbose: bool) {
    let target = &report.target;

    match &report.outcome {
        HostOutcome::NotRsync { reason } => {
            if verbose {
                print_warning(&format!("{} - does not appear to be rsync ({})", target, reason));
            } else {
                print_warning(&format!("{} - does not appear to be rsync", target));
            }
        }
        HostOutcome::Failed { error } => {
            print_error(&format!("{} - {}", target, error));
        }
        HostOutcome::Rsync { result } => {
            print_daemon_details(target, result, verbose);

            if result.modules.is_empty() {
                print_info(&format!(
                    "{} - rsync {}: no modules found",
                    target, result.version
                ));
                return;
            }

            print_success(&format!(
                "{} - rsync {}: {} modules found: {}",
                target,
                result.version,
                result.modules.len(),
                result.module_names().join(", ")
            ));
            print_module_table(target, &result.modules);
        }
        HostOutcome::Partial { result, error } => {
            print_daemon_details(target, result, verbose);
            print_warning(&format!(
                "{} - rsync {}: scan interrupted after {} module(s): {}",
                target,
                result.version,
                result.modules.len(),
                error
            ));
            if !result.modules.is_empty() {
                print_module_table(target, &result.modules);
            }
        }
    }
}

fn print_daemon_details(target: &ScanTarget, result: &ScanResult, verbose: bool) {
    if let Some(motd) = &result.motd {
        print_info(&format!("{} - rsync MOTD: {}", target, motd));
    }
    if verbose && !result.digests.is_empty() {
        print_info(&format!(
            "{} - rsync digests: {}",
            target,
            result.digests.join(" ")
        ));
    }
}

fn print_module_table(target: &ScanTarget, modules: &[Module]) {
    println!();
    for line in render_module_table(target, modules).lines() {
        println!("{}", line);
    }
    println!();
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(targets: &[String], endpoints: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("rsync-scout").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(targets.join(" ")).white().bold()
    );
    println!(
        "{} Probing {} endpoint(s)...",
        style("•").dim(),
        style(endpoints).white().bold()
    );
    println!();
}

/// Print the closing summary of a scan.
pub fn print_plain_summary(record: &ScanRecord) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{}",
        style("───────────────────────────────────────────────────────────────").dim()
    )?;
    writeln!(
        out,
        "  {} {} endpoints probed in {:.2}s",
        style("Statistics:").bold(),
        record.hosts.len(),
        record.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} rsync, {} modules, {} requiring auth",
        style(record.rsync_hosts()).green().bold(),
        style(record.module_count()).cyan(),
        style(auth_required_count(record)).yellow()
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(record.id.short()).dim()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Render a stored scan as a plain text report.
pub fn render_plain(record: &ScanRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Scan Report: {}", record.id);
    let _ = writeln!(out, "{}\n", "=".repeat(60));
    let _ = writeln!(out, "Targets:      {}", record.targets.join(" "));
    let _ = writeln!(out, "Started:      {}", record.started_at);
    let _ = writeln!(out, "Completed:    {}", record.completed_at);
    let _ = writeln!(out, "Duration:     {} ms\n", record.duration_ms);
    let _ = writeln!(
        out,
        "Summary: {} endpoints, {} rsync, {} modules\n",
        record.hosts.len(),
        record.rsync_hosts(),
        record.module_count()
    );

    for host in &record.hosts {
        match &host.outcome {
            HostOutcome::NotRsync { .. } => {
                let _ = writeln!(out, "{} - does not appear to be rsync", host.target);
            }
            HostOutcome::Failed { error } => {
                let _ = writeln!(out, "{} - failed: {}", host.target, error);
            }
            HostOutcome::Partial { result, error } => {
                let _ = writeln!(out, "{} - {}", host.target, result.service_info());
                let _ = writeln!(out, "{} - scan interrupted: {}", host.target, error);
                if !result.modules.is_empty() {
                    let _ = writeln!(out);
                    out.push_str(&render_module_table(&host.target, &result.modules));
                }
            }
            HostOutcome::Rsync { result } => {
                let _ = writeln!(out, "{} - {}", host.target, result.service_info());
                if result.modules.is_empty() {
                    let _ = writeln!(out, "{} - no modules found", host.target);
                } else {
                    let _ = writeln!(out);
                    out.push_str(&render_module_table(&host.target, &result.modules));
                }
            }
        }
        let _ = writeln!(out);
    }

    out
}

fn auth_required_count(record: &ScanRecord) -> usize {
    record
        .hosts
        .iter()
        .filter_map(|h| h.result())
        .flat_map(|r| r.modules.iter())
        .filter(|m| m.requires_auth)
        .count()
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
