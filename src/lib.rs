//! # rsync-scout - rsync daemon reconnaissance
//!
//! rsync-scout connects to rsync daemons without credentials, completes the
//! `@RSYNCD:` version handshake, captures the message of the day, lists the
//! exported modules and checks each one for an authentication challenge.
//!
//! ## Features
//!
//! - **Handshake**: Version echo, digest list capture, MOTD collection
//! - **Module Listing**: `#list` parsing up to the `@RSYNCD: EXIT` marker
//! - **Auth Probing**: One fresh connection per module
//! - **Flexible Targeting**: Single IPs, hostnames, and CIDR ranges
//! - **Reporting**: Deduplicated service and module notes
//! - **Result Persistence**: Scan history with plain, JSON, and CSV export
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use rsync_scout::scanner::RsyncScanner;
//! use rsync_scout::transport::TcpConnector;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = RsyncScanner::new(TcpConnector::default());
//!     let result = scanner.scan("192.0.2.10:873".parse().unwrap()).await.unwrap();
//!
//!     for module in &result.modules {
//!         println!("{} requires auth: {}", module.name, module.requires_auth);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Line classification, handshake, listing and auth probe
//! - [`transport`] - The byte pipe every protocol step runs over
//! - [`scanner`] - Per-endpoint sequencing and multi-target runs
//! - [`types`] - Core type definitions with newtype patterns for type safety
//! - [`config`] - Settings file and application paths
//! - [`storage`] - Scan history and service/note reports
//! - [`error`] - Error types for each layer
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod protocol;
pub mod scanner;
pub mod storage;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ProbeError};
pub use scanner::{HostOutcome, HostReport, RsyncScanner, ScanFailure};
pub use types::{Module, Port, ProtocolVersion, ScanId, ScanResult, ScanTarget, TargetSpec};
