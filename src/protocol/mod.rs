//! The line-oriented rsync daemon protocol, client side.
//!
//! An rsync daemon speaks plain text lines before any file transfer starts.
//! Lines beginning with [`RSYNC_HEADER`] are control lines; anything else is
//! free text such as the message of the day. This module covers only the
//! unauthenticated part of that exchange:
//!
//! - [`lines`] - split a response into control and data lines
//! - [`handshake`] - version exchange and MOTD capture
//! - [`listing`] - `#list` module enumeration
//! - [`auth`] - per-module auth challenge detection

pub mod auth;
pub mod handshake;
pub mod lines;
pub mod listing;

pub use auth::requires_auth;
pub use handshake::{negotiate, Negotiation};
pub use lines::{parse_lines, ParsedLines};
pub use listing::list_modules;

/// Prefix shared by every daemon control line.
pub const RSYNC_HEADER: &str = "@RSYNCD:";

/// Request for the module listing.
pub const LIST_COMMAND: &str = "#list";

/// Keyword of the control line that ends a module listing.
pub const EXIT_KEYWORD: &str = "EXIT";

/// Keyword of the control line that announces an auth challenge.
pub const AUTH_REQUIRED_KEYWORD: &str = "AUTHREQD";

/// Build a control line payload: `@RSYNCD: <payload>`, without newline.
pub fn control_line(payload: &str) -> String {
    format!("{} {}", RSYNC_HEADER, payload)
}

/// Strip `@RSYNCD: ` from `line`, returning the payload.
pub(crate) fn control_payload(line: &str) -> Option<&str> {
    line.strip_prefix(RSYNC_HEADER)?.strip_prefix(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_line_format() {
        assert_eq!(control_line("30"), "@RSYNCD: 30");
        assert_eq!(control_line(EXIT_KEYWORD), "@RSYNCD: EXIT");
    }

    #[test]
    fn test_control_payload() {
        assert_eq!(control_payload("@RSYNCD: OK"), Some("OK"));
        assert_eq!(control_payload("@RSYNCD:OK"), None);
        assert_eq!(control_payload("hello"), None);
    }
}
