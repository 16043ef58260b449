//! Append-only transcript: the single source of truth for what has been said.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Message, MessageContent, MessageRole};

/// System line reseeded by `clear`.
pub const DEFAULT_CLEAR_NOTICE: &str = "Chat cleared. How can I help you?";

/// Ordered message store. Append order is display order; entries are never
/// reordered, deduplicated, or mutated after creation. The only removal
/// path is `clear`, which reseeds the log so it is never observably empty
/// afterwards.
pub struct MessageLog {
    messages: RwLock<Vec<Message>>,
    append_listeners: RwLock<Vec<Arc<dyn Fn(Message) + Send + Sync>>>,
    clear_notice: String,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            append_listeners: RwLock::new(Vec::new()),
            clear_notice: DEFAULT_CLEAR_NOTICE.to_string(),
        }
    }

    pub fn with_clear_notice(mut self, notice: impl Into<String>) -> Self {
        self.clear_notice = notice.into();
        self
    }

    /// Append one message and return the stored record. Listeners are
    /// notified exactly once per append.
    pub async fn append(
        &self,
        content: MessageContent,
        role: MessageRole,
        agent_id: Option<String>,
    ) -> Message {
        let message = Message::new(content, role, agent_id);
        {
            let mut messages = self.messages.write().await;
            messages.push(message.clone());
        }
        debug!(message_id = %message.id, role = %message.role, "Message appended");

        self.notify_append(message.clone()).await;
        message
    }

    /// Empty the log, then reseed it with one system message. The empty
    /// and reseed steps happen under one lock so readers never observe an
    /// empty log after a clear.
    pub async fn clear(&self) -> Message {
        let reseeded = Message::new(
            MessageContent::text(self.clear_notice.clone()),
            MessageRole::System,
            None,
        );
        {
            let mut messages = self.messages.write().await;
            messages.clear();
            messages.push(reseeded.clone());
        }
        debug!("Message log cleared and reseeded");

        self.notify_append(reseeded.clone()).await;
        reseeded
    }

    pub async fn find(&self, id: Uuid) -> Option<Message> {
        let messages = self.messages.read().await;
        messages.iter().find(|message| message.id == id).cloned()
    }

    pub async fn index_of(&self, id: Uuid) -> Option<usize> {
        let messages = self.messages.read().await;
        messages.iter().position(|message| message.id == id)
    }

    pub async fn get(&self, index: usize) -> Option<Message> {
        let messages = self.messages.read().await;
        messages.get(index).cloned()
    }

    /// Snapshot of the whole transcript in append order.
    pub async fn all(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Register a render callback invoked after every append, including the
    /// reseed append performed by `clear`.
    pub async fn on_append<F>(&self, listener: F)
    where
        F: Fn(Message) + Send + Sync + 'static,
    {
        let mut listeners = self.append_listeners.write().await;
        listeners.push(Arc::new(listener));
    }

    async fn notify_append(&self, message: Message) {
        let listeners = self.append_listeners.read().await;
        for listener in listeners.iter() {
            listener(message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_append_preserves_count_and_order() {
        let log = MessageLog::new();

        for i in 0..5 {
            log.append(
                MessageContent::text(format!("message {}", i)),
                MessageRole::User,
                None,
            )
            .await;
        }

        let messages = log.all().await;
        assert_eq!(messages.len(), 5);
        assert_eq!(log.len().await, 5);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(
                message.content,
                MessageContent::text(format!("message {}", i))
            );
        }
    }

    #[tokio::test]
    async fn test_append_returns_stored_record() {
        let log = MessageLog::new();

        let stored = log
            .append(
                MessageContent::text("checking"),
                MessageRole::Agent,
                Some("spacex".to_string()),
            )
            .await;

        let found = log.find(stored.id).await.unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.agent_id.as_deref(), Some("spacex"));
    }

    #[tokio::test]
    async fn test_clear_leaves_exactly_one_message() {
        let log = MessageLog::new();

        // Clearing an empty log still reseeds.
        log.clear().await;
        assert_eq!(log.len().await, 1);

        for _ in 0..7 {
            log.append(MessageContent::text("noise"), MessageRole::User, None)
                .await;
        }
        assert_eq!(log.len().await, 8);

        let reseeded = log.clear().await;
        let messages = log.all().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], reseeded);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(
            messages[0].content,
            MessageContent::text(DEFAULT_CLEAR_NOTICE)
        );
    }

    #[tokio::test]
    async fn test_clear_uses_configured_notice() {
        let log = MessageLog::new().with_clear_notice("Fresh start.");

        let reseeded = log.clear().await;
        assert_eq!(reseeded.content, MessageContent::text("Fresh start."));
    }

    #[tokio::test]
    async fn test_find_and_index_of_absent_message() {
        let log = MessageLog::new();
        log.append(MessageContent::text("hello"), MessageRole::User, None)
            .await;

        let unknown = Uuid::new_v4();
        assert!(log.find(unknown).await.is_none());
        assert!(log.index_of(unknown).await.is_none());
    }

    #[tokio::test]
    async fn test_index_of_and_get() {
        let log = MessageLog::new();
        let first = log
            .append(MessageContent::text("one"), MessageRole::User, None)
            .await;
        let second = log
            .append(MessageContent::text("two"), MessageRole::System, None)
            .await;

        assert_eq!(log.index_of(first.id).await, Some(0));
        assert_eq!(log.index_of(second.id).await, Some(1));
        assert_eq!(log.get(1).await, Some(second));
        assert!(log.get(2).await.is_none());
    }

    #[tokio::test]
    async fn test_all_is_a_snapshot() {
        let log = MessageLog::new();
        log.append(MessageContent::text("kept"), MessageRole::User, None)
            .await;

        let mut snapshot = log.all().await;
        snapshot.clear();

        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_append_listener_notified_once_per_append() {
        let log = MessageLog::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        log.on_append(move |_message| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        log.append(MessageContent::text("one"), MessageRole::User, None)
            .await;
        log.append(MessageContent::text("two"), MessageRole::User, None)
            .await;
        log.clear().await;

        // Two appends plus the reseed append from clear.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
