//! Roster of known agents with display metadata and live status.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{AgentDescriptor, AgentStatus};

/// Notification payload for status listeners.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub agent_id: String,
    pub status: AgentStatus,
}

/// Registration-ordered lookup table of agents.
///
/// The roster is fixed at construction; only statuses change afterwards.
/// Unknown ids are the caller's problem: lookups return `None` and status
/// writes are no-ops, nothing here raises.
pub struct AgentRegistry {
    agents: RwLock<Vec<AgentDescriptor>>,
    status_listeners: RwLock<Vec<Arc<dyn Fn(StatusChange) + Send + Sync>>>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::from_roster(Vec::new())
    }

    /// Build the registry from a roster, keeping first occurrence order.
    pub fn from_roster(roster: Vec<AgentDescriptor>) -> Self {
        let mut agents: Vec<AgentDescriptor> = Vec::with_capacity(roster.len());
        for agent in roster {
            if agents.iter().any(|existing| existing.id == agent.id) {
                warn!(agent_id = %agent.id, "Duplicate agent id in roster, skipping");
                continue;
            }
            agents.push(agent);
        }

        Self {
            agents: RwLock::new(agents),
            status_listeners: RwLock::new(Vec::new()),
        }
    }

    pub async fn get(&self, id: &str) -> Option<AgentDescriptor> {
        let agents = self.agents.read().await;
        agents.iter().find(|agent| agent.id == id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        let agents = self.agents.read().await;
        agents.iter().any(|agent| agent.id == id)
    }

    /// Overwrite an agent's status in place. Returns false for unknown ids.
    pub async fn set_status(&self, id: &str, status: AgentStatus) -> bool {
        {
            let mut agents = self.agents.write().await;
            let Some(agent) = agents.iter_mut().find(|agent| agent.id == id) else {
                debug!(agent_id = %id, "Status change for unknown agent ignored");
                return false;
            };
            agent.status = status;
        }

        self.notify_status(StatusChange {
            agent_id: id.to_string(),
            status,
        })
        .await;
        true
    }

    /// Snapshot of the roster in registration order.
    pub async fn list_all(&self) -> Vec<AgentDescriptor> {
        self.agents.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    /// Register a render callback invoked after every status change.
    pub async fn on_status_change<F>(&self, listener: F)
    where
        F: Fn(StatusChange) + Send + Sync + 'static,
    {
        let mut listeners = self.status_listeners.write().await;
        listeners.push(Arc::new(listener));
    }

    async fn notify_status(&self, change: StatusChange) {
        let listeners = self.status_listeners.read().await;
        for listener in listeners.iter() {
            listener(change.clone());
        }
    }
}
