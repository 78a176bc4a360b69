//! Conversation memory: the per-session history buffer.
//!
//! Entries are appended at the back and evicted only from the front, so the
//! buffer always holds a contiguous, in-order tail of the conversation.
//! The session driving a chat owns its memory exclusively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The role of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant model
    Assistant,
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, front-evictable conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
    human_prefix: String,
    ai_prefix: String,
}

impl ConversationMemory {
    /// Create an empty memory rendering turns with the given speaker prefixes.
    pub fn new(human_prefix: impl Into<String>, ai_prefix: impl Into<String>) -> Self {
        Self {
            turns: VecDeque::new(),
            human_prefix: human_prefix.into(),
            ai_prefix: ai_prefix.into(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::new(Role::Assistant, content));
    }

    /// Remove and return the oldest entry.
    pub fn evict_oldest(&mut self) -> Option<Turn> {
        self.turns.pop_front()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn prefix_for(&self, role: Role) -> &str {
        match role {
            Role::User => &self.human_prefix,
            Role::Assistant => &self.ai_prefix,
        }
    }

    /// Serialise the history as `Prefix: text` lines, oldest first.
    pub fn buffer(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", self.prefix_for(t.role), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new("Human", "Assistant")
    }
}
