use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::http::connection::Connection;
use crate::state::SharedState;

/// Deadline for the server-side TLS handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// First byte of a TLS handshake record; anything else is treated as
/// plaintext HTTP.
const TLS_HANDSHAKE_BYTE: u8 = 0x16;

/// The accept loop: one port, both plaintext and TLS clients.
pub struct Server {
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    state: Arc<SharedState>,
}

impl Server {
    /// Binds the listening socket. With `tls` set to `None` the server runs
    /// plaintext-only and refuses TLS-looking clients.
    pub async fn bind(
        addr: &str,
        tls: Option<TlsAcceptor>,
        state: Arc<SharedState>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            tls,
            state,
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, spawning one task per connection.
    /// Session errors never escape their task.
    pub async fn serve(self) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = self.listener.accept().await?;
            debug!("Accepted connection from {}", peer);

            let tls = self.tls.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_socket(socket, tls, state).await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}

/// Decides plaintext vs TLS by peeking at the first byte, then runs the
/// matching HTTP session to completion.
async fn handle_socket(
    socket: TcpStream,
    tls: Option<TlsAcceptor>,
    state: Arc<SharedState>,
) -> Result<(), Error> {
    let mut first = [0u8; 1];
    let n = socket
        .peek(&mut first)
        .await
        .map_err(|e| Error::transport("detect", e))?;
    if n == 0 {
        // Peer went away before sending anything.
        return Ok(());
    }

    if first[0] == TLS_HANDSHAKE_BYTE {
        let Some(acceptor) = tls else {
            return Err(Error::Protocol(
                "TLS client hello received but TLS is not configured".to_string(),
            ));
        };

        let stream = timeout(HANDSHAKE_TIMEOUT, acceptor.accept(socket))
            .await
            .map_err(|_| Error::Timeout { op: "handshake" })?
            .map_err(|e| Error::transport("handshake", e))?;
        debug!("TLS handshake complete");

        Connection::new(stream, state).run().await
    } else {
        Connection::new(socket, state).run().await
    }
}
