//! Module enumeration via `#list`.

use super::{control_line, EXIT_KEYWORD, LIST_COMMAND};
use crate::error::ProbeResult;
use crate::transport::Transport;
use crate::types::Module;
use tracing::debug;

/// Split one listing line into a module: name, then an optional comment
/// after the first tab. Blank lines and the EXIT marker yield `None`.
fn parse_listing_line(line: &str) -> Option<Module> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (name, comment) = line.split_once('\t').unwrap_or((line, ""));
    Some(Module::new(name.trim(), comment.trim()))
}

/// Parse a complete `#list` response, stopping at `@RSYNCD: EXIT`.
pub fn parse_listing(response: &str) -> Vec<Module> {
    let exit = control_line(EXIT_KEYWORD);

    response
        .split('\n')
        .map(str::trim)
        .take_while(|line| *line != exit)
        .filter_map(parse_listing_line)
        .collect()
}

/// Upper bound on a buffered listing response.
const MAX_LISTING_BYTES: usize = 64 * 1024;

/// True once `response` holds a complete `@RSYNCD: EXIT` line.
fn has_exit_line(response: &str) -> bool {
    let exit = control_line(EXIT_KEYWORD);
    response.split('\n').any(|line| line.trim() == exit)
}

/// Ask a negotiated connection for its module listing.
///
/// The daemon may deliver the listing in several segments, so reads continue
/// until the EXIT line arrives, a read comes back empty (idle peer or EOF),
/// or `MAX_LISTING_BYTES` have been buffered.
///
/// An empty list is a normal outcome: the daemon may export nothing listable,
/// or the read may simply have timed out.
pub async fn list_modules<T>(transport: &mut T) -> ProbeResult<Vec<Module>>
where
    T: Transport + ?Sized,
{
    transport
        .write_bytes(format!("{}\n", LIST_COMMAND).as_bytes())
        .await?;

    let mut response = String::new();
    loop {
        let chunk = transport.read_available().await?;
        if chunk.is_empty() {
            break;
        }
        response.push_str(&chunk);

        if has_exit_line(&response) || response.len() >= MAX_LISTING_BYTES {
            break;
        }
    }

    let modules = parse_listing(&response);
    debug!(count = modules.len(), bytes = response.len(), "module listing");
    Ok(modules)
}
