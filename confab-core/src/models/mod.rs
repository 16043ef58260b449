mod agent;
mod message;

pub use agent::{AgentDescriptor, AgentStatus};
pub use message::{Message, MessageContent, MessageRole};
