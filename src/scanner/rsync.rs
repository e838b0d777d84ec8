//! Per-endpoint rsync reconnaissance.
//!
//! Sequence for one endpoint:
//! 1. connect, negotiate, list modules, disconnect
//! 2. for every listed module, in order: connect, negotiate, request the
//!    module, note whether an auth challenge comes back, disconnect
//!
//! Only one connection is open at a time.

use crate::error::{ProbeError, ProbeResult};
use crate::protocol::{list_modules, negotiate, requires_auth};
use crate::transport::{Connector, Transport};
use crate::types::{Module, ScanResult};
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{debug, info};

/// An endpoint scan that stopped early.
///
/// `partial` carries what was confirmed before `error`: the version, MOTD and
/// every module probed so far. It is `None` when the connection or version
/// exchange failed, i.e. nothing about the endpoint is known.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ScanFailure {
    pub partial: Option<ScanResult>,
    pub error: ProbeError,
}

impl ScanFailure {
    fn interrupted(partial: ScanResult, error: ProbeError) -> Self {
        Self {
            partial: Some(partial),
            error,
        }
    }

    /// True when the endpoint never completed the rsync handshake.
    pub fn is_not_rsync(&self) -> bool {
        self.partial.is_none() && self.error.is_not_rsync()
    }
}

impl From<ProbeError> for ScanFailure {
    fn from(error: ProbeError) -> Self {
        Self {
            partial: None,
            error,
        }
    }
}

/// Scans rsync endpoints through a [`Connector`].
///
/// # Example
///
/// ```rust,ignore
/// use rsync_scout::scanner::RsyncScanner;
/// use rsync_scout::transport::TcpConnector;
///
/// let scanner = RsyncScanner::new(TcpConnector::default());
/// let result = scanner.scan("192.0.2.10:873".parse()?).await?;
/// println!("{}", result.service_info());
/// ```
pub struct RsyncScanner<C> {
    connector: C,
}

impl<C: Connector> RsyncScanner<C> {
    /// Create a scanner using `connector` for every connection.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Scan one endpoint.
    ///
    /// A failed version exchange yields a [`ScanFailure`] wrapping
    /// [`ProbeError::NotRsync`] with no partial result. Connection errors after
    /// the handshake abort the endpoint but keep the confirmed service info.
    pub async fn scan(&self, addr: SocketAddr) -> Result<ScanResult, ScanFailure> {
        let mut conn = self.connector.open(addr).await?;

        let negotiation = match negotiate(&mut conn).await {
            Ok(negotiation) => negotiation,
            Err(e) => {
                close_quietly(&mut conn, addr).await;
                return Err(e.into());
            }
        };
        info!(%addr, version = %negotiation.version, "rsync daemon");

        let mut result = ScanResult {
            version: negotiation.version,
            digests: negotiation.digests,
            motd: negotiation.motd,
            modules: Vec::new(),
        };

        let listing = list_modules(&mut conn).await;
        close_quietly(&mut conn, addr).await;
        let listing = match listing {
            Ok(listing) => listing,
            Err(e) => return Err(ScanFailure::interrupted(result, e)),
        };

        result.modules.reserve(listing.len());
        for module in listing {
            match self.probe_module(addr, &module).await {
                Ok(challenged) => result.modules.push(module.with_auth(challenged)),
                Err(e) => return Err(ScanFailure::interrupted(result, e)),
            }
        }

        Ok(result)
    }

    /// Check one module on its own connection.
    ///
    /// The negotiation result is only used to reach the point where the
    /// daemon accepts a module name; a failed exchange falls through to the
    /// probe, which then reads as "no auth required".
    async fn probe_module(&self, addr: SocketAddr, module: &Module) -> ProbeResult<bool> {
        let mut conn = self.connector.open(addr).await?;

        if let Err(e) = negotiate(&mut conn).await {
            if !e.is_not_rsync() {
                close_quietly(&mut conn, addr).await;
                return Err(e);
            }
            debug!(%addr, module = %module.name, error = %e, "probe negotiation failed");
        }

        let challenged = requires_auth(&mut conn, &module.name).await;
        close_quietly(&mut conn, addr).await;
        challenged
    }
}

async fn close_quietly<T: Transport>(conn: &mut T, addr: SocketAddr) {
    if let Err(e) = conn.close().await {
        debug!(%addr, error = %e, "close failed");
    }
}
