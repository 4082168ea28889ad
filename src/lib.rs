//! flexserve - Plain/TLS HTTP and websocket server
//!
//! A single-port server that speaks HTTP/1.1 with pipelining over plaintext
//! or TLS and promotes token-authenticated upgrade requests to websocket
//! echo sessions.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod server;
pub mod state;
pub mod transport;
pub mod ws;
