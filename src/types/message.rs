use serde::{Deserialize, Serialize};

/// A message with role and content. An ordered sequence of messages forms
/// the conversation sent in a single request; messages are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Build the conversation for one request: optional system prompt first,
/// then the user prompt.
pub fn conversation(prompt: &str, system_prompt: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));
    messages
}
