//! Connection acceptance and TLS provisioning.
//!
//! - **`listener`**: binds the port, sniffs TLS vs plaintext on the first
//!   byte and spawns one session task per connection
//! - **`tls`**: certificate loading and the server-side TLS configuration

pub mod listener;
pub mod tls;

pub use listener::Server;
