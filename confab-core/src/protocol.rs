//! Wire types for the chat endpoint.
//!
//! The backend accepts `{message, agent}` and answers with a success flag,
//! an ordered list of workflow log lines, and an optional result. Logical
//! failures come back as `success: false` with an error string; the body
//! shape is the same either way, so one reply type covers both.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/chat`.
///
/// `agent` is the focus filter: `None` serializes to `null`, which asks the
/// coordinator to route the message itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub agent: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, agent: Option<String>) -> Self {
        Self {
            message: message.into(),
            agent,
        }
    }
}

/// One line of coordinator progress attributed to an agent.
///
/// The backend stamps each line with a timestamp string; it is preserved
/// for display but never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowLogEntry {
    #[serde(default)]
    pub agent: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl WorkflowLogEntry {
    pub fn new(agent: Option<String>, message: impl Into<String>) -> Self {
        Self {
            agent,
            message: message.into(),
            timestamp: None,
        }
    }
}

/// Final result of a coordinated task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub raw_data: Option<serde_json::Value>,
}

/// Reply body from the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub workflow_logs: Vec<WorkflowLogEntry>,
    #[serde(default)]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            workflow_logs: Vec::new(),
            result: None,
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_null_agent() {
        let request = ChatRequest::new("hello", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["message"], "hello");
        assert!(json["agent"].is_null());
    }

    #[test]
    fn test_request_serializes_focused_agent() {
        let request = ChatRequest::new("forecast?", Some("weather".to_string()));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["agent"], "weather");
    }

    #[test]
    fn test_response_deserializes_minimal_body() {
        let reply: ChatResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();

        assert!(reply.success);
        assert!(reply.error.is_none());
        assert!(reply.workflow_logs.is_empty());
        assert!(reply.result.is_none());
    }

    #[test]
    fn test_response_deserializes_full_body() {
        let body = r#"{
            "success": true,
            "workflow_logs": [
                {"agent": "spacex", "message": "Checking launches", "timestamp": "12:01:33"},
                {"agent": null, "message": "Routing request"}
            ],
            "result": {"summary": "Launch on Friday", "raw_data": {"flight": 291}},
            "timestamp": "2025-03-14T12:01:34"
        }"#;
        let reply: ChatResponse = serde_json::from_str(body).unwrap();

        assert_eq!(reply.workflow_logs.len(), 2);
        assert_eq!(reply.workflow_logs[0].agent.as_deref(), Some("spacex"));
        assert_eq!(reply.workflow_logs[0].timestamp.as_deref(), Some("12:01:33"));
        assert!(reply.workflow_logs[1].agent.is_none());

        let result = reply.result.unwrap();
        assert_eq!(result.summary.as_deref(), Some("Launch on Friday"));
        assert_eq!(result.raw_data, Some(serde_json::json!({"flight": 291})));
    }

    #[test]
    fn test_response_deserializes_failure_body() {
        let body = r#"{"success": false, "error": "coordinator offline", "workflow_logs": []}"#;
        let reply: ChatResponse = serde_json::from_str(body).unwrap();

        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("coordinator offline"));
    }
}
