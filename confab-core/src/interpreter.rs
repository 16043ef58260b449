//! Turns one chat endpoint reply into an ordered plan of state changes.
//!
//! Interpretation is a pure function over the reply and a roster snapshot;
//! applying the plan (and running its timers) is the session's job. The
//! ordering is a contract: an agent's busy flip precedes its message
//! append, and status reverts are scheduled rather than applied so later
//! effects are never delayed behind a timer.

use std::time::Duration;

use crate::models::{AgentDescriptor, AgentStatus, MessageContent, MessageRole};
use crate::protocol::ChatResponse;

/// How long an agent stays busy after speaking before reverting to online.
pub const STATUS_REVERT_DELAY: Duration = Duration::from_millis(1000);

/// Summary fallback when the backend omits or blanks the result summary.
pub const DEFAULT_RESULT_SUMMARY: &str = "Task completed successfully!";

/// Title given to raw result payloads rendered as data blocks.
pub const RAW_DATA_TITLE: &str = "Raw API Data";

/// Roster id that result summaries are attributed to.
pub const SUMMARY_AGENT_ID: &str = "summary";

/// Error fallback when a failed reply carries no error text.
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";

/// One atomic state change produced by interpreting a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetAgentStatus {
        agent_id: String,
        status: AgentStatus,
    },
    AppendMessage {
        content: MessageContent,
        role: MessageRole,
        agent_id: Option<String>,
    },
    ScheduleStatusRevert {
        agent_id: String,
        delay: Duration,
        status: AgentStatus,
    },
}

fn resolves(roster: &[AgentDescriptor], id: &str) -> bool {
    roster.iter().any(|agent| agent.id == id)
}

fn append_text(text: &str, role: MessageRole, agent_id: Option<String>) -> Effect {
    Effect::AppendMessage {
        content: MessageContent::text(text),
        role,
        agent_id,
    }
}

/// Interpret one reply against a roster snapshot.
///
/// A failed reply short-circuits to a single system append carrying the
/// error text. Otherwise each workflow line from a known agent expands to
/// busy, append, scheduled revert; lines from unknown or absent agents
/// degrade to unattributed system appends. A result contributes the
/// summary (attributed to the summary agent when the roster has one) and,
/// when raw data is present, a verbatim data block.
pub fn interpret(reply: &ChatResponse, roster: &[AgentDescriptor]) -> Vec<Effect> {
    if !reply.success {
        let error = reply
            .error
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(UNKNOWN_ERROR_TEXT);
        return vec![append_text(error, MessageRole::System, None)];
    }

    let mut effects = Vec::new();

    for entry in &reply.workflow_logs {
        match entry.agent.as_deref().filter(|id| resolves(roster, id)) {
            Some(id) => {
                effects.push(Effect::SetAgentStatus {
                    agent_id: id.to_string(),
                    status: AgentStatus::Busy,
                });
                effects.push(append_text(
                    &entry.message,
                    MessageRole::Agent,
                    Some(id.to_string()),
                ));
                effects.push(Effect::ScheduleStatusRevert {
                    agent_id: id.to_string(),
                    delay: STATUS_REVERT_DELAY,
                    status: AgentStatus::Online,
                });
            }
            None => effects.push(append_text(&entry.message, MessageRole::System, None)),
        }
    }

    if let Some(result) = &reply.result {
        let summary = result
            .summary
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_RESULT_SUMMARY);
        if resolves(roster, SUMMARY_AGENT_ID) {
            effects.push(append_text(
                summary,
                MessageRole::Agent,
                Some(SUMMARY_AGENT_ID.to_string()),
            ));
        } else {
            effects.push(append_text(summary, MessageRole::System, None));
        }

        if let Some(raw_data) = &result.raw_data {
            effects.push(Effect::AppendMessage {
                content: MessageContent::data_block(RAW_DATA_TITLE, raw_data.clone()),
                role: MessageRole::System,
                agent_id: None,
            });
        }
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{TaskResult, WorkflowLogEntry};

    fn create_test_roster() -> Vec<AgentDescriptor> {
        vec![
            AgentDescriptor::new("spacex", "SpaceX Agent", "rocket", "Launch data"),
            AgentDescriptor::new("weather", "Weather Agent", "cloud", "Forecast lookups"),
            AgentDescriptor::new("summary", "Summary Agent", "note", "Summaries"),
        ]
    }

    fn success_reply() -> ChatResponse {
        ChatResponse {
            success: true,
            error: None,
            workflow_logs: Vec::new(),
            result: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_failed_reply_yields_single_system_append() {
        let reply = ChatResponse::failure("X");

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(
            effects,
            vec![Effect::AppendMessage {
                content: MessageContent::text("X"),
                role: MessageRole::System,
                agent_id: None,
            }]
        );
    }

    #[test]
    fn test_failed_reply_without_error_text_uses_fallback() {
        let mut reply = ChatResponse::failure("");
        reply.error = None;

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(effects.len(), 1);
        assert_eq!(
            effects[0],
            Effect::AppendMessage {
                content: MessageContent::text(UNKNOWN_ERROR_TEXT),
                role: MessageRole::System,
                agent_id: None,
            }
        );
    }

    #[test]
    fn test_failed_reply_ignores_workflow_logs() {
        let mut reply = ChatResponse::failure("boom");
        reply.workflow_logs = vec![WorkflowLogEntry::new(
            Some("weather".to_string()),
            "never shown",
        )];

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_known_agent_entry_expands_to_busy_append_revert() {
        let mut reply = success_reply();
        reply.workflow_logs = vec![WorkflowLogEntry::new(
            Some("weather".to_string()),
            "Fetching forecast",
        )];

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(
            effects,
            vec![
                Effect::SetAgentStatus {
                    agent_id: "weather".to_string(),
                    status: AgentStatus::Busy,
                },
                Effect::AppendMessage {
                    content: MessageContent::text("Fetching forecast"),
                    role: MessageRole::Agent,
                    agent_id: Some("weather".to_string()),
                },
                Effect::ScheduleStatusRevert {
                    agent_id: "weather".to_string(),
                    delay: Duration::from_millis(1000),
                    status: AgentStatus::Online,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_agent_degrades_to_system_append() {
        let mut reply = success_reply();
        reply.workflow_logs = vec![WorkflowLogEntry::new(
            Some("ghost".to_string()),
            "spooky progress",
        )];

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(
            effects,
            vec![Effect::AppendMessage {
                content: MessageContent::text("spooky progress"),
                role: MessageRole::System,
                agent_id: None,
            }]
        );
    }

    #[test]
    fn test_entry_without_agent_degrades_to_system_append() {
        let mut reply = success_reply();
        reply.workflow_logs = vec![WorkflowLogEntry::new(None, "Routing request")];

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::AppendMessage {
                role: MessageRole::System,
                agent_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_summary_falls_back_and_raw_data_is_verbatim() {
        let mut reply = success_reply();
        reply.result = Some(TaskResult {
            summary: None,
            raw_data: Some(serde_json::json!({"x": 1})),
        });

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(effects.len(), 2);
        assert_eq!(
            effects[0],
            Effect::AppendMessage {
                content: MessageContent::text(DEFAULT_RESULT_SUMMARY),
                role: MessageRole::Agent,
                agent_id: Some("summary".to_string()),
            }
        );
        assert_eq!(
            effects[1],
            Effect::AppendMessage {
                content: MessageContent::data_block(RAW_DATA_TITLE, serde_json::json!({"x": 1})),
                role: MessageRole::System,
                agent_id: None,
            }
        );
    }

    #[test]
    fn test_empty_summary_falls_back() {
        let mut reply = success_reply();
        reply.result = Some(TaskResult {
            summary: Some(String::new()),
            raw_data: None,
        });

        let effects = interpret(&reply, &create_test_roster());

        assert_eq!(
            effects,
            vec![Effect::AppendMessage {
                content: MessageContent::text(DEFAULT_RESULT_SUMMARY),
                role: MessageRole::Agent,
                agent_id: Some("summary".to_string()),
            }]
        );
    }

    #[test]
    fn test_summary_degrades_without_summary_agent() {
        let roster = vec![AgentDescriptor::new(
            "weather",
            "Weather Agent",
            "cloud",
            "Forecast lookups",
        )];
        let mut reply = success_reply();
        reply.result = Some(TaskResult {
            summary: Some("All done".to_string()),
            raw_data: None,
        });

        let effects = interpret(&reply, &roster);

        assert_eq!(
            effects,
            vec![Effect::AppendMessage {
                content: MessageContent::text("All done"),
                role: MessageRole::System,
                agent_id: None,
            }]
        );
    }

    #[test]
    fn test_success_without_logs_or_result_yields_no_effects() {
        let effects = interpret(&success_reply(), &create_test_roster());
        assert!(effects.is_empty());
    }

    #[test]
    fn test_mixed_reply_preserves_input_order() {
        let mut reply = success_reply();
        reply.workflow_logs = vec![
            WorkflowLogEntry::new(Some("spacex".to_string()), "Checking launches"),
            WorkflowLogEntry::new(Some("ghost".to_string()), "unknown speaker"),
            WorkflowLogEntry::new(Some("weather".to_string()), "Checking weather"),
        ];
        reply.result = Some(TaskResult {
            summary: Some("Looks good".to_string()),
            raw_data: Some(serde_json::json!([1, 2, 3])),
        });

        let effects = interpret(&reply, &create_test_roster());

        // spacex triple, ghost single, weather triple, summary, data block.
        assert_eq!(effects.len(), 9);
        assert!(matches!(
            &effects[0],
            Effect::SetAgentStatus { agent_id, status: AgentStatus::Busy } if agent_id == "spacex"
        ));
        assert!(matches!(
            &effects[2],
            Effect::ScheduleStatusRevert { agent_id, .. } if agent_id == "spacex"
        ));
        assert!(matches!(
            &effects[3],
            Effect::AppendMessage { role: MessageRole::System, .. }
        ));
        assert!(matches!(
            &effects[4],
            Effect::SetAgentStatus { agent_id, status: AgentStatus::Busy } if agent_id == "weather"
        ));
        assert!(matches!(
            &effects[7],
            Effect::AppendMessage { agent_id: Some(id), .. } if id == "summary"
        ));
        assert!(matches!(
            &effects[8],
            Effect::AppendMessage { content: MessageContent::DataBlock { .. }, .. }
        ));
    }
}
