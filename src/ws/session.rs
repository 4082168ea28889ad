use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::{Message, Role};
use tracing::{info, warn};

use crate::auth;
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::http::writer::write_response;
use crate::transport::ByteStream;
use crate::ws::queue::OutboundQueue;

/// Server identification sent on the handshake response: the transport
/// library version plus the product tag.
pub const SERVER_IDENT: &str = "tokio-tungstenite/0.26 flexserve";

/// Entry point of the upgrade handoff.
///
/// Takes exclusive ownership of the transport and the parsed upgrade
/// request. The token gate runs before the websocket handshake completes:
/// a rejected peer only ever sees a final HTTP 401 response followed by a
/// transport close, never a half-established websocket.
pub async fn run<S: ByteStream>(stream: S, req: Request) -> Result<(), Error> {
    match auth::authorize(&req) {
        Ok(_claims) => accept(stream, &req).await,
        Err(Error::Auth(detail)) => {
            warn!("websocket token rejected: {detail}");
            reject(stream, &detail).await
        }
        Err(other) => Err(other),
    }
}

/// Terminal action for a failed authentication: one HTTP-style error
/// response on the not-yet-upgraded socket, then close.
async fn reject<S: ByteStream>(mut stream: S, detail: &str) -> Result<(), Error> {
    let response = ResponseBuilder::new(StatusCode::Unauthorized)
        .header("Content-Type", "application/json")
        .header("Server", SERVER_IDENT)
        .keep_alive(false)
        .body(format!("Unauthorized: {detail}").into_bytes())
        .build();

    write_response(&mut stream, &response)
        .await
        .map_err(|e| Error::transport("write", e))?;
    stream
        .close()
        .await
        .map_err(|e| Error::transport("shutdown", e))?;
    Ok(())
}

/// Completes the websocket handshake and runs the session.
async fn accept<S: ByteStream>(mut stream: S, req: &Request) -> Result<(), Error> {
    let key = req
        .header("Sec-WebSocket-Key")
        .ok_or_else(|| Error::Protocol("upgrade request without Sec-WebSocket-Key".to_string()))?;

    let response = ResponseBuilder::new(StatusCode::SwitchingProtocols)
        .header("Upgrade", "websocket")
        .header("Connection", "Upgrade")
        .header("Sec-WebSocket-Accept", derive_accept_key(key.as_bytes()))
        .header("Server", SERVER_IDENT)
        .build();

    write_response(&mut stream, &response)
        .await
        .map_err(|e| Error::transport("handshake", e))?;

    let ws = WebSocketStream::from_raw_socket(stream, Role::Server, None).await;
    WsSession::new(ws).run().await
}

/// One authenticated websocket session: a read-echo loop with a strictly
/// ordered outbound queue.
pub struct WsSession<S: ByteStream> {
    ws: WebSocketStream<S>,
    queue: OutboundQueue,
    connection_id: String,
}

impl<S: ByteStream> WsSession<S> {
    pub fn new(ws: WebSocketStream<S>) -> Self {
        Self {
            ws,
            queue: OutboundQueue::new(),
            connection_id: String::new(),
        }
    }

    pub async fn run(mut self) -> Result<(), Error> {
        self.connection_id = generate_connection_id();
        info!("websocket session {} established", self.connection_id);

        loop {
            let Some(next) = self.ws.next().await else {
                // Stream ended after the close exchange.
                return Ok(());
            };

            match next {
                // An orderly close ends the session silently; reply so the
                // close handshake completes before the stream is dropped.
                Ok(Message::Close(_)) => {
                    let _ = self.ws.close(None).await;
                    return Ok(());
                }

                // Echo the message with the framing it arrived with.
                Ok(msg @ (Message::Text(_) | Message::Binary(_))) => self.send(msg).await?,

                // Pings and pongs are answered by the protocol layer.
                Ok(_) => {}

                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(()),
                Err(WsError::Io(e)) => return Err(Error::transport("read", e)),
                Err(e) => return Err(Error::Protocol(e.to_string())),
            }
        }
    }

    /// Appends to the outbound queue; when the writer was idle, drives the
    /// write loop until the queue drains. Head-of-queue writes only, so
    /// delivery is strictly in order with one write in flight.
    async fn send(&mut self, message: Message) -> Result<(), Error> {
        if !self.queue.push(message) {
            return Ok(());
        }

        while let Some(front) = self.queue.front() {
            let frame = front.clone();
            self.ws.send(frame).await.map_err(|e| match e {
                WsError::Io(io) => Error::transport("write", io),
                other => Error::Protocol(other.to_string()),
            })?;
            self.queue.pop();
        }
        Ok(())
    }
}

/// Random 16-character alphanumeric connection identifier.
pub fn generate_connection_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
