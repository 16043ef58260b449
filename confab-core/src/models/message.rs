use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Agent,
    System,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Agent => write!(f, "agent"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// Message body: plain text, or a titled data block carrying an arbitrary
/// JSON tree. Data-block payloads are opaque to the core; they are stored
/// and exported verbatim, never transformed or truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    DataBlock { title: String, payload: serde_json::Value },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn data_block(title: impl Into<String>, payload: serde_json::Value) -> Self {
        MessageContent::DataBlock {
            title: title.into(),
            payload,
        }
    }

    pub fn is_data_block(&self) -> bool {
        matches!(self, MessageContent::DataBlock { .. })
    }

    /// Plain-text rendering: the text itself, or the pretty-printed payload
    /// for data blocks. Used for resubmission and terminal display.
    pub fn as_plain_text(&self) -> String {
        match self {
            MessageContent::Text { text } => text.clone(),
            MessageContent::DataBlock { payload, .. } => {
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: MessageContent,
    pub role: MessageRole,
    pub agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(content: MessageContent, role: MessageRole, agent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            role,
            agent_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
