//! Cross-session delivery registry.
//!
//! This is an extension point: websocket sessions do not register themselves
//! by default, so the map stays empty in a stock server. When multi-session
//! delivery is wired up this is the only state touched from more than one
//! session's task, hence the mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

/// Handle through which a message can be delivered to one session.
pub type SessionHandle = mpsc::UnboundedSender<String>;

pub struct Registry {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a session under its connection id. Does not affect the
    /// session's lifetime; a stale handle is dropped on the next delivery.
    pub fn connect(&self, connection_id: impl Into<String>, handle: SessionHandle) {
        self.sessions
            .lock()
            .expect("registry lock poisoned")
            .insert(connection_id.into(), handle);
    }

    pub fn disconnect(&self, connection_id: &str) {
        self.sessions
            .lock()
            .expect("registry lock poisoned")
            .remove(connection_id);
    }

    /// Delivers to exactly one session if registered. Returns whether the
    /// message was handed off; a missing id is a no-op.
    pub fn send(&self, connection_id: &str, message: impl Into<String>) -> bool {
        let sessions = self.sessions.lock().expect("registry lock poisoned");
        match sessions.get(connection_id) {
            Some(handle) => handle.send(message.into()).is_ok(),
            None => false,
        }
    }

    /// Delivers to every registered session, returning how many accepted it.
    pub fn broadcast(&self, message: &str) -> usize {
        let sessions = self.sessions.lock().expect("registry lock poisoned");
        sessions
            .values()
            .filter(|handle| handle.send(message.to_string()).is_ok())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
