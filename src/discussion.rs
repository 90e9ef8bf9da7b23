use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::DchatError;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TOKEN_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A persisted conversation: metadata plus an append-only message list.
///
/// The message list is never reordered or truncated; the token limit
/// binds the request view produced by [`Discussion::history_for_request`],
/// not the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub code: String,
    pub id: usize,
    title: String,
    model: String,
    token_limit: usize,
    system_message: Option<String>,
    messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Discussion {
    pub fn new(code: String, id: usize, title: String, model: String, token_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            code,
            id,
            title,
            model,
            token_limit,
            system_message: None,
            messages: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        self.touch();
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    pub fn set_token_limit(&mut self, limit: i64) -> Result<(), DchatError> {
        if limit <= 0 {
            return Err(DchatError::InvalidArgument(format!(
                "Token limit must be a positive integer, got {}",
                limit
            )));
        }
        self.token_limit = limit as usize;
        self.touch();
        Ok(())
    }

    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    pub fn set_system_message(&mut self, content: impl Into<String>) {
        self.system_message = Some(content.into());
        self.touch();
    }

    /// Appends a message. A system role replaces the single system slot
    /// instead of extending the list.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        match role {
            Role::System => self.set_system_message(content),
            _ => {
                self.messages.push(Message::new(role, content));
                self.touch();
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Full conversation view: system message first (when set), then every
    /// message in append order. This is what `!history` shows and `!search`
    /// scans.
    pub fn history(&self) -> Vec<Message> {
        let mut view = Vec::with_capacity(self.messages.len() + 1);
        if let Some(content) = &self.system_message {
            view.push(Message::new(Role::System, content.clone()));
        }
        view.extend(self.messages.iter().cloned());
        view
    }

    /// The exact context sent to the gateway. Starts from [`history`] and
    /// drops the oldest non-system messages until the token estimate fits
    /// the limit; the system message and the newest message always survive.
    pub fn history_for_request(&self) -> Vec<Message> {
        let mut view = self.history();
        let reserved = usize::from(self.system_message.is_some());
        while estimated_tokens(&view) > self.token_limit && view.len() > reserved + 1 {
            view.remove(reserved);
        }
        view
    }

    /// Case-insensitive containment search over the full history, in
    /// original order.
    pub fn search(&self, needle: &str) -> Vec<Message> {
        let needle = needle.to_lowercase();
        self.history()
            .into_iter()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn estimated_tokens(&self) -> usize {
        estimated_tokens(&self.history())
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

// Rough estimate: four characters per token.
fn estimated_tokens(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| m.content.chars().count())
        .sum::<usize>()
        / 4
}
