//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, render_csv};
pub use json_format::print_json;
pub use plain::{
    print_error, print_host_report, print_info, print_plain_summary, print_scan_header,
    print_success, print_warning, render_module_table, render_plain,
};

use crate::cli::OutputFormat;
use crate::storage::ScanRecord;
use std::io;

/// Format and print a finished scan according to the specified format.
///
/// Plain output only prints the closing summary; per-host sections are
/// printed while the scan runs.
pub fn print_results(record: &ScanRecord, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain_summary(record),
        OutputFormat::Json => print_json(record),
        OutputFormat::Csv => print_csv(record),
    }
}
