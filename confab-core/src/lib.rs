pub mod config;
pub mod error;
pub mod export;
pub mod interpreter;
pub mod log;
pub mod models;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;

pub use config::{
    AgentSeed, ChatConfig, ConfabConfig, EndpointConfig, LoggingConfig, QuickAction,
};
pub use error::{ConfabError, ConfabResult};
pub use export::TranscriptSnapshot;
pub use interpreter::{
    interpret, Effect, DEFAULT_RESULT_SUMMARY, RAW_DATA_TITLE, STATUS_REVERT_DELAY,
    SUMMARY_AGENT_ID, UNKNOWN_ERROR_TEXT,
};
pub use log::{MessageLog, DEFAULT_CLEAR_NOTICE};
pub use models::{AgentDescriptor, AgentStatus, Message, MessageContent, MessageRole};
pub use protocol::{ChatRequest, ChatResponse, TaskResult, WorkflowLogEntry};
pub use registry::{AgentRegistry, StatusChange};
pub use session::{ChatSession, SendOutcome, SessionState};
pub use transport::{ChatBackend, DynChatBackend, HttpBackend, CHAT_ENDPOINT_PATH};
