//! User message value object

use serde::{Deserialize, Serialize};

/// A message submitted by the user for an orchestration turn (Value Object)
///
/// Guaranteed non-empty after trimming. Precondition checks on submission
/// happen before any network call, so an invalid message never produces a
/// pending response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    content: String,
}

impl UserMessage {
    /// Create a new message
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Message cannot be empty");
        Self { content }
    }

    /// Try to create a new message, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the message content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for UserMessage {
    fn from(s: &str) -> Self {
        UserMessage::new(s)
    }
}

impl From<String> for UserMessage {
    fn from(s: String) -> Self {
        UserMessage::new(s)
    }
}
