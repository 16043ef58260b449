use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use confab_core::log::MessageLog;
use confab_core::registry::AgentRegistry;
use confab_core::session::{ChatSession, SendOutcome};
use confab_core::transport::HttpBackend;
use confab_core::ConfabConfig;

use crate::output;

/// One-shot send: deliver the message, print what came back, exit.
pub async fn cmd_send(
    config: &ConfabConfig,
    message: &str,
    agent: Option<&str>,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let session = create_session(config);
    let roster = output::roster_index(&session.registry().list_all().await);

    if let Some(agent_id) = agent {
        if !session.select_agent(agent_id).await {
            anyhow::bail!(
                "Unknown agent '{}'. Run 'confab agents' to list them.",
                agent_id
            );
        }
    }

    let skip = session.log().len().await;
    let outcome = session.send(message).await;
    if outcome == SendOutcome::IgnoredEmpty {
        anyhow::bail!("Message is empty");
    }

    let messages = session.log().all().await;
    for message in &messages[skip..] {
        println!("{}", output::render_message(message, &roster));
    }

    if let Some(path) = export {
        let snapshot = session.transcript().await;
        snapshot.write_to(path)?;
        println!();
        println!("{} Transcript written to {}", "✓".green(), path.display());
    }

    session.close().await;

    Ok(())
}

fn create_session(config: &ConfabConfig) -> ChatSession {
    let registry = Arc::new(AgentRegistry::from_roster(config.roster()));
    let log = Arc::new(MessageLog::new().with_clear_notice(config.chat.clear_notice.clone()));
    let backend = Arc::new(HttpBackend::with_timeout(
        config.base_url(),
        Duration::from_secs(config.endpoint.request_timeout_secs),
    ));

    ChatSession::new(registry, log, backend)
}
