//! Remote chat endpoint access behind a narrow trait.
//!
//! The coordinator answers logical failures as HTTP 500 with a JSON body in
//! the same shape as a success reply, so the HTTP backend parses the body
//! regardless of status code. Only unreachable endpoints, timeouts, and
//! unreadable bodies surface as errors; the session folds those into a
//! system message rather than raising them to its caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ConfabError, ConfabResult};
use crate::protocol::{ChatRequest, ChatResponse};

/// Path of the chat endpoint relative to the configured base URL.
pub const CHAT_ENDPOINT_PATH: &str = "/api/chat";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn dispatch(&self, request: ChatRequest) -> ConfabResult<ChatResponse>;
}

pub type DynChatBackend = Arc<dyn ChatBackend>;

/// reqwest-based backend speaking to a coordinator over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_ENDPOINT_PATH)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn backend_name(&self) -> &str {
        "http"
    }

    async fn dispatch(&self, request: ChatRequest) -> ConfabResult<ChatResponse> {
        let url = self.chat_url();
        debug!(%url, agent = ?request.agent, "Dispatching chat request");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(reply) => {
                debug!(%status, success = reply.success, "Chat reply received");
                Ok(reply)
            }
            Err(err) => {
                warn!(%status, error = %err, "Chat endpoint returned an unreadable body");
                Err(ConfabError::MalformedReply(format!(
                    "{} (HTTP {})",
                    err, status
                )))
            }
        }
    }
}
