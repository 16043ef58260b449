use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use confab_core::log::MessageLog;
use confab_core::registry::AgentRegistry;
use confab_core::session::{ChatSession, SendOutcome};
use confab_core::transport::HttpBackend;
use confab_core::ConfabConfig;

use crate::output;

/// Interactive REPL: plain lines go to the coordinator, slash commands
/// drive the session, bare numbers fire quick actions.
pub async fn cmd_chat(config: &ConfabConfig) -> anyhow::Result<()> {
    debug!(endpoint = %config.base_url(), "Starting chat session");

    let session = create_session(config);
    let roster = output::roster_index(&session.registry().list_all().await);

    // Everything appended to the log, including our own lines, is printed
    // through these callbacks so the transcript renders in one place.
    {
        let roster = roster.clone();
        session
            .log()
            .on_append(move |message| {
                println!("{}", output::render_message(&message, &roster));
            })
            .await;
    }
    {
        let roster = roster.clone();
        session
            .registry()
            .on_status_change(move |change| {
                println!("{}", output::render_status_change(&change, &roster));
            })
            .await;
    }

    print_banner(config, &session).await;
    session.open().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&session).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_slash_command(&session, config, command).await? {
                break;
            }
            continue;
        }

        // Bare numbers submit the matching quick action.
        if let Ok(number) = line.parse::<usize>() {
            if number >= 1 {
                if let Some(action) = config.quick_actions.get(number - 1) {
                    session.send(&action.message).await;
                    continue;
                }
            }
        }

        session.send(line).await;
    }

    session.close().await;
    println!();
    println!("{}", "Bye!".dimmed());

    Ok(())
}

fn create_session(config: &ConfabConfig) -> ChatSession {
    let registry = Arc::new(AgentRegistry::from_roster(config.roster()));
    let log = Arc::new(MessageLog::new().with_clear_notice(config.chat.clear_notice.clone()));
    let backend = Arc::new(HttpBackend::with_timeout(
        config.base_url(),
        Duration::from_secs(config.endpoint.request_timeout_secs),
    ));

    ChatSession::new(registry, log, backend).with_welcome(config.chat.welcome_message.clone())
}

async fn print_banner(config: &ConfabConfig, session: &ChatSession) {
    println!("{}", "Confab".cyan().bold());
    println!(
        "{}",
        format!("Coordinator: {}", config.base_url()).dimmed()
    );
    println!(
        "{}",
        format!(
            "Session started {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
        .dimmed()
    );
    println!();

    let table = output::roster_table(&session.registry().list_all().await);
    println!("{table}");
    println!();

    if !config.quick_actions.is_empty() {
        println!("{}", "Quick actions (type the number to send):".bold());
        print_quick_actions(config);
        println!();
    }

    println!("{}", "Type /help for commands, /quit to leave.".dimmed());
    println!();
}

async fn print_prompt(session: &ChatSession) -> anyhow::Result<()> {
    let prompt = match session.focused_agent().await {
        Some(id) => format!("[{}] > ", id),
        None => "> ".to_string(),
    };

    print!("{}", prompt.bold());
    std::io::stdout().flush()?;

    Ok(())
}

/// Returns `false` when the user asked to leave.
async fn handle_slash_command(
    session: &ChatSession,
    config: &ConfabConfig,
    command: &str,
) -> anyhow::Result<bool> {
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));
    let arg = rest.trim();

    match name.to_lowercase().as_str() {
        "help" => print_help(),
        "agents" => {
            let table = output::roster_table(&session.registry().list_all().await);
            println!("{table}");
        }
        "focus" => {
            if arg.is_empty() {
                println!("{}", "Usage: /focus <agent-id>".yellow());
            } else if !session.select_agent(arg).await {
                println!(
                    "{}",
                    format!("Unknown agent '{}'. Type /agents to list them.", arg).yellow()
                );
            }
        }
        "unfocus" => {
            session.clear_focus().await;
            println!("{}", "Focus cleared.".dimmed());
        }
        "clear" => {
            session.clear().await;
        }
        "retry" => retry_last(session).await,
        "export" => {
            let snapshot = session.transcript().await;
            let file_name = if arg.is_empty() {
                snapshot.default_file_name()
            } else {
                arg.to_string()
            };
            let path = PathBuf::from(file_name);

            match snapshot.write_to(&path) {
                Ok(()) => {
                    println!("{} Transcript written to {}", "✓".green(), path.display());
                }
                Err(err) => println!("{} Export failed: {}", "✗".red(), err),
            }
        }
        "quick" => {
            if arg.is_empty() {
                println!("{}", "Quick actions:".bold());
                print_quick_actions(config);
            } else {
                match arg.parse::<usize>() {
                    Ok(number) if number >= 1 && number <= config.quick_actions.len() => {
                        session.send(&config.quick_actions[number - 1].message).await;
                    }
                    _ => println!(
                        "{}",
                        format!("No quick action '{}'. Type /quick to list them.", arg).yellow()
                    ),
                }
            }
        }
        "quit" | "exit" => return Ok(false),
        other => {
            println!(
                "{}",
                format!("Unknown command '/{}'. Type /help for commands.", other).yellow()
            );
        }
    }

    Ok(true)
}

/// Re-submit the latest user message, through `resend` when it already
/// has a reply and directly when it is the last thing in the log.
async fn retry_last(session: &ChatSession) {
    let messages = session.log().all().await;
    let Some(index) = messages.iter().rposition(|message| message.is_from_user()) else {
        println!("{}", "Nothing to retry.".yellow());
        return;
    };

    let outcome = match messages.get(index + 1) {
        Some(reply) => session.resend(reply.id).await,
        None => session.send(&messages[index].content.as_plain_text()).await,
    };

    if outcome == SendOutcome::IgnoredNoTarget {
        println!("{}", "Nothing to retry.".yellow());
    }
}

fn print_quick_actions(config: &ConfabConfig) {
    for (index, action) in config.quick_actions.iter().enumerate() {
        println!("  {}. {}", index + 1, action.label);
    }
}

fn print_help() {
    println!("{}", "Commands".cyan().bold());
    println!("  /agents          Show the agent roster");
    println!("  /focus <id>      Route messages to one agent");
    println!("  /unfocus         Clear the agent focus");
    println!("  /quick [n]       List quick actions, or send action n");
    println!("  /retry           Send the last message again");
    println!("  /clear           Clear the transcript");
    println!("  /export [path]   Write the transcript to a JSON file");
    println!("  /help            Show this help");
    println!("  /quit            Leave the chat");
    println!();
    println!("{}", "Anything else is sent to the coordinator.".dimmed());
}
