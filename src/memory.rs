//! Bounded conversational memory.
//!
//! A FIFO of question/answer turn pairs capped at `max_turns` pairs. Turns
//! are only ever appended in pairs, so the history length stays even and
//! never exceeds `max_turns * 2`; the oldest pairs are evicted first.

use crate::models::{Role, Turn};

/// Rendering of an empty history, kept stable because it is embedded in prompts.
pub const NO_HISTORY: &str = "No previous conversation.";

#[derive(Debug)]
pub struct ConversationMemory {
    max_turns: usize,
    history: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            history: Vec::new(),
        }
    }

    /// Append one interaction (user turn then assistant turn), evicting the
    /// oldest pairs once the cap is exceeded. Always succeeds; empty strings
    /// are stored as-is.
    pub fn add_interaction(&mut self, user_message: &str, assistant_message: &str) {
        self.history.push(Turn {
            role: Role::User,
            content: user_message.to_string(),
        });
        self.history.push(Turn {
            role: Role::Assistant,
            content: assistant_message.to_string(),
        });

        let max_messages = self.max_turns * 2;
        if self.history.len() > max_messages {
            let excess = self.history.len() - max_messages;
            self.history.drain(..excess);
        }
    }

    /// Human-readable rendering of all retained turns, oldest first.
    pub fn formatted_history(&self) -> String {
        if self.history.is_empty() {
            return NO_HISTORY.to_string();
        }

        self.history
            .iter()
            .map(|turn| {
                let speaker = match turn.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Drop the entire history. Idempotent.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Number of retained question/answer pairs.
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}
