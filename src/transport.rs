//! Byte transport used by the rsync protocol steps.
//!
//! The protocol code never touches sockets directly. It sees a [`Transport`]
//! that can write bytes, perform one bounded read, and close; fresh
//! connections come from a [`Connector`]. Timeouts are fixed when the
//! connector is built and travel with every connection it opens.

use crate::error::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Default bound on every protocol read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum bytes taken by a single read.
const READ_BUFFER_SIZE: usize = 8192;

/// One open connection to a daemon.
#[async_trait]
pub trait Transport: Send {
    /// Write all of `bytes`.
    async fn write_bytes(&mut self, bytes: &[u8]) -> ProbeResult<()>;

    /// Perform exactly one read bounded by the read timeout.
    ///
    /// Returns whatever arrived, decoded as lossy UTF-8. A timeout or EOF
    /// yields an empty string; I/O failures are errors.
    async fn read_available(&mut self) -> ProbeResult<String>;

    /// Shut the connection down.
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Opens fresh connections to a daemon endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Conn: Transport;

    /// Open a new connection to `addr`.
    async fn open(&self, addr: SocketAddr) -> ProbeResult<Self::Conn>;
}

/// A [`Transport`] over any async byte stream.
pub struct StreamTransport<S> {
    stream: S,
    read_timeout: Duration,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap `stream`, bounding every read by `read_timeout`.
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
        }
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_bytes(&mut self, bytes: &[u8]) -> ProbeResult<()> {
        trace!(len = bytes.len(), "write");
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_available(&mut self) -> ProbeResult<String> {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        match timeout(self.read_timeout, self.stream.read(&mut buffer)).await {
            Ok(Ok(n)) => {
                trace!(len = n, "read");
                Ok(String::from_utf8_lossy(&buffer[..n]).into_owned())
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => {
                debug!(timeout_ms = self.read_timeout.as_millis() as u64, "read timed out");
                Ok(String::new())
            }
        }
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Transport over a TCP connection.
pub type TcpTransport = StreamTransport<TcpStream>;

/// Opens TCP connections with fixed connect and read timeouts.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpConnector {
    /// Create a connector.
    ///
    /// # Arguments
    /// * `connect_timeout` - Bound on establishing each connection
    /// * `read_timeout` - Bound on every read on the resulting connections
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpTransport;

    async fn open(&self, addr: SocketAddr) -> ProbeResult<Self::Conn> {
        debug!(%addr, "connecting");
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(StreamTransport::new(stream, self.read_timeout)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                Err(ProbeError::ConnectionRefused)
            }
            Ok(Err(e)) => Err(ProbeError::ConnectionFailed {
                target: addr.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}
