//! Session orchestration: one user-facing chat context.
//!
//! The session owns the pipeline: validate input, append the user message,
//! dispatch to the backend, interpret the reply, apply the resulting
//! effects in order. It is the only writer of `SessionState`; while a
//! reply is in flight further sends are shed, which is the whole
//! backpressure story. Status reverts run as spawned timers that hold an
//! `Arc` of the registry and check the session's closed flag before
//! touching it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::export::TranscriptSnapshot;
use crate::interpreter::{interpret, Effect};
use crate::log::MessageLog;
use crate::models::{AgentStatus, Message, MessageContent, MessageRole};
use crate::protocol::ChatRequest;
use crate::registry::AgentRegistry;
use crate::transport::DynChatBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingReply => write!(f, "awaiting_reply"),
        }
    }
}

/// What happened to a submitted input. The ignored variants are silent at
/// the transcript level; callers that care can branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message went through the full pipeline (including error replies
    /// resolved into system messages).
    Delivered,
    /// Input was empty after trimming; nothing happened.
    IgnoredEmpty,
    /// A reply is already in flight; nothing happened.
    IgnoredBusy,
    /// Resend target was missing or not preceded by a user message.
    IgnoredNoTarget,
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }
}

pub struct ChatSession {
    registry: Arc<AgentRegistry>,
    log: Arc<MessageLog>,
    backend: DynChatBackend,
    state: RwLock<SessionState>,
    focus: RwLock<Option<String>>,
    welcome_message: Option<String>,
    is_closed: Arc<AtomicBool>,
    revert_tasks: RwLock<Vec<JoinHandle<()>>>,
}

impl ChatSession {
    pub fn new(
        registry: Arc<AgentRegistry>,
        log: Arc<MessageLog>,
        backend: DynChatBackend,
    ) -> Self {
        Self {
            registry,
            log,
            backend,
            state: RwLock::new(SessionState::Idle),
            focus: RwLock::new(None),
            welcome_message: None,
            is_closed: Arc::new(AtomicBool::new(false)),
            revert_tasks: RwLock::new(Vec::new()),
        }
    }

    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome_message = Some(welcome.into());
        self
    }

    pub fn registry(&self) -> Arc<AgentRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn log(&self) -> Arc<MessageLog> {
        Arc::clone(&self.log)
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn focused_agent(&self) -> Option<String> {
        self.focus.read().await.clone()
    }

    /// Announce the configured welcome line. Call once at session start.
    pub async fn open(&self) -> Option<Message> {
        let welcome = self.welcome_message.clone()?;
        info!("Chat session opened");
        Some(
            self.log
                .append(MessageContent::text(welcome), MessageRole::System, None)
                .await,
        )
    }

    /// Run one input through the pipeline.
    ///
    /// The user message is appended before the network call, so it is part
    /// of the transcript even when the backend is unreachable. Failures of
    /// any kind resolve to one appended system message; this method never
    /// returns an error.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Ignoring empty input");
            return SendOutcome::IgnoredEmpty;
        }

        {
            let mut state = self.state.write().await;
            if *state == SessionState::AwaitingReply {
                debug!("Send rejected, a reply is already in flight");
                return SendOutcome::IgnoredBusy;
            }
            *state = SessionState::AwaitingReply;
        }

        let focus = self.focus.read().await.clone();
        self.log
            .append(MessageContent::text(trimmed), MessageRole::User, None)
            .await;

        let request = ChatRequest::new(trimmed, focus);
        match self.backend.dispatch(request).await {
            Ok(reply) => {
                let roster = self.registry.list_all().await;
                let effects = interpret(&reply, &roster);
                debug!(effect_count = effects.len(), "Applying interpreted effects");
                self.apply_effects(effects).await;
            }
            Err(err) => {
                warn!(
                    backend = %self.backend.backend_name(),
                    error = %err,
                    "Chat dispatch failed"
                );
                self.log
                    .append(
                        MessageContent::text(format!("Network error: {}", err)),
                        MessageRole::System,
                        None,
                    )
                    .await;
            }
        }

        *self.state.write().await = SessionState::Idle;
        SendOutcome::Delivered
    }

    /// Re-submit the user message preceding `message_id`.
    ///
    /// Mirrors a "regenerate" action on a reply: the addressed message must
    /// exist and the message right before it must be from the user.
    pub async fn resend(&self, message_id: Uuid) -> SendOutcome {
        let Some(index) = self.log.index_of(message_id).await else {
            debug!(message_id = %message_id, "Resend target not found");
            return SendOutcome::IgnoredNoTarget;
        };
        if index == 0 {
            return SendOutcome::IgnoredNoTarget;
        }

        let Some(previous) = self.log.get(index - 1).await else {
            return SendOutcome::IgnoredNoTarget;
        };
        if !previous.is_from_user() {
            debug!(message_id = %message_id, "Resend target not preceded by a user message");
            return SendOutcome::IgnoredNoTarget;
        }

        self.send(&previous.content.as_plain_text()).await
    }

    /// Focus subsequent sends on one agent. Unknown ids are ignored.
    pub async fn select_agent(&self, id: &str) -> bool {
        let Some(agent) = self.registry.get(id).await else {
            warn!(agent_id = %id, "Focus request for unknown agent ignored");
            return false;
        };

        *self.focus.write().await = Some(agent.id.clone());
        info!(agent_id = %agent.id, "Agent focus set");
        self.log
            .append(
                MessageContent::text(format!(
                    "Now focusing on {}. {}",
                    agent.name, agent.description
                )),
                MessageRole::System,
                None,
            )
            .await;
        true
    }

    pub async fn clear_focus(&self) {
        *self.focus.write().await = None;
        debug!("Agent focus cleared");
    }

    /// Empty the transcript and reseed it with the clear notice.
    pub async fn clear(&self) -> Message {
        self.log.clear().await
    }

    pub async fn transcript(&self) -> TranscriptSnapshot {
        TranscriptSnapshot::capture(&self.log, &self.registry).await
    }

    /// Cancel outstanding status reverts. Further reverts that were racing
    /// the abort see the closed flag and do nothing.
    pub async fn close(&self) {
        if self.is_closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut tasks = self.revert_tasks.write().await;
        let pending = tasks.len();
        for handle in tasks.drain(..) {
            handle.abort();
        }
        info!(cancelled_reverts = pending, "Chat session closed");
    }

    async fn apply_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetAgentStatus { agent_id, status } => {
                    self.registry.set_status(&agent_id, status).await;
                }
                Effect::AppendMessage {
                    content,
                    role,
                    agent_id,
                } => {
                    self.log.append(content, role, agent_id).await;
                }
                Effect::ScheduleStatusRevert {
                    agent_id,
                    delay,
                    status,
                } => {
                    self.schedule_revert(agent_id, delay, status).await;
                }
            }
        }
    }

    async fn schedule_revert(&self, agent_id: String, delay: Duration, status: AgentStatus) {
        let registry = Arc::clone(&self.registry);
        let is_closed = Arc::clone(&self.is_closed);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if is_closed.load(Ordering::SeqCst) {
                return;
            }
            registry.set_status(&agent_id, status).await;
        });

        let mut tasks = self.revert_tasks.write().await;
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.is_closed.store(true, Ordering::SeqCst);
    }
}
