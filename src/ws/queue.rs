use std::collections::VecDeque;

use tokio_tungstenite::tungstenite::protocol::Message;

/// Ordered outbound queue for one websocket session.
///
/// Discipline: a message is always appended first; the caller only starts a
/// write when `push` reports the writer was idle, and then keeps writing the
/// head until the queue drains. That guarantees strict in-order delivery
/// with at most one write in flight per session.
pub struct OutboundQueue {
    items: VecDeque<Message>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends a message. Returns `true` when the queue was idle before the
    /// append, meaning the caller must start the write loop.
    pub fn push(&mut self, message: Message) -> bool {
        self.items.push_back(message);
        self.items.len() == 1
    }

    /// The message currently being written, if any.
    pub fn front(&self) -> Option<&Message> {
        self.items.front()
    }

    /// Removes the head after its write completed.
    pub fn pop(&mut self) -> Option<Message> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}
