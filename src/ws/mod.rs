//! Websocket session engine.
//!
//! A session is created by the upgrade handoff in the HTTP layer: it takes
//! exclusive ownership of the transport plus the parsed upgrade request,
//! verifies the bearer token, completes the handshake and then echoes
//! messages until the peer closes.
//!
//! - **`session`**: authentication gate, handshake and the read/echo loop
//! - **`queue`**: the strictly ordered outbound send queue

pub mod queue;
pub mod session;
