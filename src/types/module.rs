//! Data model for what a daemon reveals: its protocol version, MOTD and modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version announced in the daemon greeting, e.g. `30` or `31.0`.
///
/// Kept verbatim for echo-back and reporting; never compared numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(String);

impl ProtocolVersion {
    /// Accept a token of the form `\d+(\.\d+)?`.
    pub fn parse(token: &str) -> Option<Self> {
        let (major, minor) = match token.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (token, None),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if all_digits(major) && minor.map_or(true, all_digits) {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }

    /// The version exactly as the daemon sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An exported rsync module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module name as listed by the daemon.
    pub name: String,
    /// Free-text comment; empty when the daemon gave none.
    pub comment: String,
    /// Whether the daemon issued an auth challenge for this module.
    ///
    /// Only meaningful once the module has been probed.
    pub requires_auth: bool,
}

impl Module {
    /// Create a module from a listing entry. Auth defaults to `false`.
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            requires_auth: false,
        }
    }

    /// Return a copy of this module carrying the probed auth requirement.
    #[must_use]
    pub fn with_auth(self, requires_auth: bool) -> Self {
        Self {
            requires_auth,
            ..self
        }
    }
}

/// Everything learned about one rsync endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Version from the greeting.
    pub version: ProtocolVersion,
    /// Checksum digests advertised after the version (rsync 3.2+).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digests: Vec<String>,
    /// Message of the day, if the daemon sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    /// Modules in listing order.
    pub modules: Vec<Module>,
}

impl ScanResult {
    /// Summary used for the service report, e.g.
    /// `rsync protocol version 31.0, MOTD 'Welcome'`.
    pub fn service_info(&self) -> String {
        let mut info = format!("rsync protocol version {}", self.version);
        if let Some(motd) = &self.motd {
            info.push_str(&format!(", MOTD '{}'", motd));
        }
        info
    }

    /// Names of all listed modules, in order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}
