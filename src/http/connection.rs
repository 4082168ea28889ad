use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::time::timeout;
use tracing::debug;

use crate::error::Error;
use crate::http::handler::handle_request;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::state::SharedState;
use crate::transport::ByteStream;
use crate::ws;

/// Maximum responses queued awaiting flush; reading pauses at this limit.
pub const QUEUE_LIMIT: usize = 8;

/// Ceiling on the request body size, in bytes.
pub const BODY_LIMIT: usize = 10_000;

/// Inactivity deadline for a read on the transport.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// One HTTP/1.1 connection, generic over the transport.
///
/// Drives the request/response pipeline as a state machine. Pipelined
/// requests are answered strictly in order through the bounded response
/// queue; an upgrade request consumes the session and moves the transport
/// into a websocket session of the same kind.
pub struct Connection<S: ByteStream> {
    stream: S,
    buffer: Vec<u8>,
    queue: VecDeque<ResponseWriter>,
    state: ConnectionState,
    shared: Arc<SharedState>,
}

pub enum ConnectionState {
    Reading,
    Dispatching(Request),
    Writing,
    Upgrading(Request),
    Closing,
    Closed,
}

impl<S: ByteStream> Connection<S> {
    pub fn new(stream: S, shared: Arc<SharedState>) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(4096),
            queue: VecDeque::new(),
            state: ConnectionState::Reading,
            shared,
        }
    }

    pub async fn run(mut self) -> Result<(), Error> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Reading);
            match state {
                ConnectionState::Reading => {
                    self.state = self.advance_read().await?;
                }

                ConnectionState::Dispatching(request) => {
                    let response = handle_request(self.shared.doc_root(), &request);
                    self.queue.push_back(ResponseWriter::new(&response));
                    self.state = ConnectionState::Reading;
                }

                ConnectionState::Writing => {
                    self.state = self.advance_write().await?;
                }

                ConnectionState::Upgrading(request) => {
                    // Consuming handoff: the stream moves into the websocket
                    // session and this engine never touches it again. The
                    // websocket layer manages its own timeouts.
                    debug!("upgrading {} connection to websocket", self.stream.kind());
                    return ws::session::run(self.stream, request).await;
                }

                ConnectionState::Closing => {
                    self.stream
                        .close()
                        .await
                        .map_err(|e| Error::transport("shutdown", e))?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    return Ok(());
                }
            }
        }
    }

    /// One step of the read side: dispatch a buffered request if a whole one
    /// has arrived, otherwise pull more bytes from the transport.
    async fn advance_read(&mut self) -> Result<ConnectionState, Error> {
        // Backpressure: pause reading while the response queue is full.
        if self.queue.len() >= QUEUE_LIMIT {
            return Ok(ConnectionState::Writing);
        }

        // A pipelining client may already have a complete request buffered.
        match parse_http_request(&self.buffer, BODY_LIMIT) {
            Ok((request, consumed)) => {
                self.buffer.drain(..consumed);
                if request.is_upgrade() {
                    return Ok(ConnectionState::Upgrading(request));
                }
                return Ok(ConnectionState::Dispatching(request));
            }
            Err(ParseError::Incomplete) => {}
            Err(e) => return Err(e.into()),
        }

        // Flush queued responses before blocking on the socket, otherwise a
        // client waiting for answers before sending more would deadlock.
        if !self.queue.is_empty() {
            return Ok(ConnectionState::Writing);
        }

        let mut chunk = [0u8; 4096];
        let n = timeout(READ_TIMEOUT, self.stream.read(&mut chunk))
            .await
            .map_err(|_| Error::Timeout { op: "read" })?
            .map_err(|e| Error::transport("read", e))?;

        if n == 0 {
            // Peer closed. On an idle connection this is a normal end of
            // stream and not worth logging.
            if !self.buffer.is_empty() {
                debug!("peer closed the connection mid-request");
            }
            return Ok(ConnectionState::Closing);
        }

        self.buffer.extend_from_slice(&chunk[..n]);
        Ok(ConnectionState::Reading)
    }

    /// Writes the head of the queue; single writer, strict FIFO.
    async fn advance_write(&mut self) -> Result<ConnectionState, Error> {
        let Some(writer) = self.queue.front_mut() else {
            return Ok(ConnectionState::Reading);
        };

        writer
            .write_to_stream(&mut self.stream)
            .await
            .map_err(|e| Error::transport("write", std::io::Error::other(e)))?;

        let keep_alive = writer.keep_alive();
        self.queue.pop_front();

        if !keep_alive {
            // Close-semantic response: tear the connection down even if more
            // responses are still queued behind it.
            return Ok(ConnectionState::Closing);
        }

        // Reading resumes as soon as the queue drops below its limit; the
        // read side flushes any remainder before blocking on the socket.
        if self.queue.len() < QUEUE_LIMIT {
            Ok(ConnectionState::Reading)
        } else {
            Ok(ConnectionState::Writing)
        }
    }
}
