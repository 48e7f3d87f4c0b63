//! Conversation history replayed on every completion call

use serde::Serialize;

use nbpilot_provider::Message;

/// A single role-tagged turn
pub type Turn = Message;

/// Ordered turns, always seeded with one system turn
#[derive(Debug, Clone, Serialize)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(system_prompt)],
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.turns[0].content
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Only the seed turn is present
    pub fn is_fresh(&self) -> bool {
        self.turns.len() == 1
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Append a completed exchange; turns are only ever added in pairs
    pub(crate) fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push(Turn::user(user));
        self.turns.push(Turn::assistant(assistant));
    }

    /// Drop everything but the seed turn
    pub fn reset(&mut self) {
        self.turns.truncate(1);
    }

    /// Messages for the next completion call: all turns plus the pending input
    pub fn request(&self, pending: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.extend_from_slice(&self.turns);
        messages.push(Message::user(pending));
        messages
    }
}
