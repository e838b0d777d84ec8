//! Error types for rsync-scout.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{PortError, ScanIdError, TargetError};

/// Main error type for probing an rsync daemon.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The peer did not complete the `@RSYNCD:` version exchange.
    #[error("does not appear to be rsync: {0}")]
    NotRsync(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Connection failed to {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// True when the failure means "this is not an rsync daemon" rather than
    /// a transport problem.
    pub fn is_not_rsync(&self) -> bool {
        matches!(self, Self::NotRsync(_))
    }
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised while loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by scan and report persistence.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save: {0}")]
    SaveFailed(String),

    #[error("failed to load: {0}")]
    LoadFailed(String),

    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error for CLI command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    ScanId(#[from] ScanIdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_rsync_classification() {
        assert!(ProbeError::NotRsync("no greeting".into()).is_not_rsync());
        assert!(!ProbeError::Timeout.is_not_rsync());
        assert!(!ProbeError::ConnectionRefused.is_not_rsync());
    }

    #[test]
    fn test_cli_error_is_transparent() {
        let err: CliError = ProbeError::ConnectionRefused.into();
        assert_eq!(err.to_string(), "Connection refused");
    }
}
