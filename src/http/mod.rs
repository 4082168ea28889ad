//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.1 server engine with keep-alive,
//! pipelining and websocket upgrade support.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The main connection handler implementing the request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and parsing utilities
//! - **`response`**: HTTP response representation with builder pattern
//! - **`handler`**: The static-file request handler
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ├─ Upgrade request → Upgrading (handoff to websocket)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Generate response, enqueue it
//!        └──────┬───────────┘
//!               │ Response queued (up to 8 pipelined)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send queued responses in order
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closing → Closed
//! ```
//!
//! Reading pauses while eight responses are queued and resumes once the
//! queue drains below that limit. A response carrying the close semantic
//! always tears the connection down, even with responses still queued.

pub mod connection;
pub mod handler;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
