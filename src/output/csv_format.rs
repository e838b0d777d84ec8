//! CSV output formatting: one row per module, or one row per endpoint when
//! it listed no modules.

use crate::scanner::HostOutcome;
use crate::storage::ScanRecord;
use crate::types::ScanResult;
use std::io::{self, Write};

const HEADER: [&str; 9] = [
    "host",
    "port",
    "status",
    "version",
    "motd",
    "module",
    "comment",
    "requires_auth",
    "detail",
];

/// Write CSV rows for `record` to `out`.
pub fn write_csv<W: Write>(record: &ScanRecord, out: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;

    for host in &record.hosts {
        let ip = host.target.ip.to_string();
        let port = host.target.port.to_string();
        let endpoint = [ip.as_str(), port.as_str()];

        match &host.outcome {
            HostOutcome::Rsync { result } => {
                write_daemon_rows(&mut wtr, endpoint, "rsync", result, "")?;
            }
            HostOutcome::Partial { result, error } => {
                write_daemon_rows(&mut wtr, endpoint, "partial", result, error)?;
            }
            HostOutcome::NotRsync { reason } => {
                write_bare_row(&mut wtr, endpoint, "not_rsync", reason)?;
            }
            HostOutcome::Failed { error } => {
                write_bare_row(&mut wtr, endpoint, "failed", error)?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// One row per module, or a single row when none were listed.
fn write_daemon_rows<W: Write>(
    wtr: &mut csv::Writer<W>,
    [ip, port]: [&str; 2],
    status: &str,
    result: &ScanResult,
    detail: &str,
) -> csv::Result<()> {
    let version = result.version.as_str();
    let motd = result.motd.as_deref().unwrap_or("");

    if result.modules.is_empty() {
        return wtr.write_record([ip, port, status, version, motd, "", "", "", detail]);
    }

    for module in &result.modules {
        wtr.write_record([
            ip,
            port,
            status,
            version,
            motd,
            module.name.as_str(),
            module.comment.as_str(),
            if module.requires_auth { "true" } else { "false" },
            detail,
        ])?;
    }
    Ok(())
}

fn write_bare_row<W: Write>(
    wtr: &mut csv::Writer<W>,
    [ip, port]: [&str; 2],
    status: &str,
    detail: &str,
) -> csv::Result<()> {
    wtr.write_record([ip, port, status, "", "", "", "", "", detail])
}

/// Render CSV for `record` into a string.
pub fn render_csv(record: &ScanRecord) -> csv::Result<String> {
    let mut buffer = Vec::new();
    write_csv(record, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Print CSV for `record` to stdout.
pub fn print_csv(record: &ScanRecord) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(record, stdout.lock()).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
