//! Byte-stream duality: one session engine, two transports.
//!
//! The HTTP and websocket engines are written once against [`ByteStream`] and
//! instantiated for either a raw TCP socket or a server-side TLS stream. A
//! stream is exclusively owned by exactly one session at a time; the upgrade
//! handoff moves the value, so the HTTP session cannot touch it afterwards.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Deadline for the TLS close-alert exchange.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// The minimal transport capability a session engine needs.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {
    /// Transport kind, for logging.
    fn kind(&self) -> &'static str;

    /// Gracefully close the send direction of the transport.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

impl ByteStream for TcpStream {
    fn kind(&self) -> &'static str {
        "plain"
    }

    /// Plain close is a TCP half-close: shut down the send direction only.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send {
        async move { self.shutdown().await }
    }
}

impl ByteStream for tokio_rustls::server::TlsStream<TcpStream> {
    fn kind(&self) -> &'static str {
        "tls"
    }

    /// TLS close sends a close_notify alert, bounded by [`CLOSE_TIMEOUT`].
    ///
    /// Peers frequently drop the connection without finishing the alert
    /// exchange; the resulting truncated-stream condition surfaces as
    /// `UnexpectedEof` and is not treated as an error on this path.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send {
        async move {
            match timeout(CLOSE_TIMEOUT, self.shutdown()).await {
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "tls close-alert timed out",
                )),
                Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
                Ok(res) => res,
            }
        }
    }
}
