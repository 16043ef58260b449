pub mod agents;
pub mod chat;
pub mod send;

pub use agents::cmd_agents;
pub use chat::cmd_chat;
pub use send::cmd_send;
