//! Version exchange with an rsync daemon.
//!
//! The daemon speaks first: on connect it pushes its `@RSYNCD: <version>`
//! greeting, sometimes preceded by MOTD text. The client completes the
//! exchange by echoing the same version line, after which the daemon may send
//! the rest of its MOTD.

use super::lines::parse_lines;
use super::{control_line, control_payload};
use crate::error::{ProbeError, ProbeResult};
use crate::transport::Transport;
use crate::types::ProtocolVersion;
use tracing::debug;

/// Outcome of a completed version exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    /// Version announced by the daemon.
    pub version: ProtocolVersion,
    /// Digest names listed after the version, if any.
    pub digests: Vec<String>,
    /// MOTD lines from both reads joined with `\n`; `None` when there were none.
    pub motd: Option<String>,
}

/// Match a greeting control line, returning the version and any digest list.
///
/// Accepts `@RSYNCD: 30` and `@RSYNCD: 31.0 sha512 md5`; a trailing `\r` is
/// ignored.
pub fn parse_version_line(line: &str) -> Option<(ProtocolVersion, Vec<String>)> {
    let payload = control_payload(line.trim_end_matches('\r'))?;

    let (token, rest) = match payload.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (payload, ""),
    };

    let version = ProtocolVersion::parse(token)?;
    let digests = rest.split_whitespace().map(str::to_string).collect();
    Some((version, digests))
}

/// Run the version exchange on a freshly opened connection.
///
/// Fails with [`ProbeError::NotRsync`] when the daemon sends nothing or no
/// control line carries a version; nothing is written in that case.
pub async fn negotiate<T>(transport: &mut T) -> ProbeResult<Negotiation>
where
    T: Transport + ?Sized,
{
    let greeting = transport.read_available().await?;
    if greeting.is_empty() {
        return Err(ProbeError::NotRsync("no greeting received".to_string()));
    }

    let greeting = parse_lines(Some(greeting.as_str()));

    let (version, digests) = greeting
        .control
        .iter()
        .find_map(|line| parse_version_line(line))
        .ok_or_else(|| ProbeError::NotRsync("no rsync negotiation found".to_string()))?;

    debug!(%version, "daemon greeting");
    transport
        .write_bytes(format!("{}\n", control_line(version.as_str())).as_bytes())
        .await?;

    let post = transport.read_available().await?;
    let post = parse_lines(Some(post.as_str()));

    let motd_lines: Vec<String> = greeting.data.into_iter().chain(post.data).collect();
    let motd = if motd_lines.is_empty() {
        None
    } else {
        Some(motd_lines.join("\n"))
    };

    Ok(Negotiation {
        version,
        digests,
        motd,
    })
}
