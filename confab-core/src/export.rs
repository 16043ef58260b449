//! Transcript export: serialize a session for download or archival.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfabResult;
use crate::log::MessageLog;
use crate::models::{AgentDescriptor, Message};
use crate::registry::AgentRegistry;

/// Point-in-time copy of the transcript and roster.
///
/// Message contents, including data-block payloads, are serialized
/// verbatim; nothing is transformed or truncated on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub messages: Vec<Message>,
    pub agents: Vec<AgentDescriptor>,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptSnapshot {
    pub async fn capture(log: &MessageLog, registry: &AgentRegistry) -> Self {
        Self {
            messages: log.all().await,
            agents: registry.list_all().await,
            timestamp: Utc::now(),
        }
    }

    /// Human-readable JSON bytes, two-space indented.
    pub fn to_pretty_json(&self) -> ConfabResult<Vec<u8>> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut writer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut serializer)?;
        Ok(writer)
    }

    /// Download-style file name, e.g. `chat-export-2025-03-14.json`.
    pub fn default_file_name(&self) -> String {
        format!("chat-export-{}.json", self.timestamp.format("%Y-%m-%d"))
    }

    pub fn write_to(&self, path: &Path) -> ConfabResult<()> {
        std::fs::write(path, self.to_pretty_json()?)?;
        info!(path = %path.display(), message_count = self.messages.len(), "Transcript exported");
        Ok(())
    }
}
