//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod module;
mod port;
mod scan_id;
mod target;

pub use module::{Module, ProtocolVersion, ScanResult};
pub use port::{Port, PortError};
pub use scan_id::{ScanId, ScanIdError};
pub use target::{ScanTarget, TargetError, TargetSpec};
