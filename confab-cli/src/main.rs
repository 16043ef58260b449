use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use confab_core::ConfabConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{cmd_agents, cmd_chat, cmd_send};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "confab")]
#[command(version = VERSION)]
#[command(about = "Confab - Terminal chat console for multi-agent AI coordinator backends")]
#[command(long_about = r#"
Confab connects to a multi-agent AI coordinator over HTTP and turns its
replies into a running conversation: agent work lines stream in as they
arrive, agents flip between online and busy, and results land as summaries
or raw data blocks.

Use 'confab chat' for an interactive session, 'confab send' for one-shot
messages, and 'confab agents' to inspect the configured roster.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(
        long,
        global = true,
        env = "CONFAB_ENDPOINT",
        help = "Coordinator base URL (overrides config)"
    )]
    endpoint: Option<String>,

    #[arg(long, global = true, help = "Load configuration from a specific file")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start an interactive chat session")]
    Chat,

    #[command(about = "Send one message and print the replies")]
    Send {
        #[arg(help = "Message text to send")]
        message: String,

        #[arg(short, long, help = "Route the message to one agent")]
        agent: Option<String>,

        #[arg(short, long, value_name = "PATH", help = "Write the transcript to a JSON file")]
        export: Option<PathBuf>,
    },

    #[command(about = "List the configured agents")]
    Agents {
        #[arg(short, long, default_value = "table", help = "Output format (table, json)")]
        format: String,
    },

    #[command(about = "List the configured quick actions")]
    Actions,

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        endpoint,
        config,
        ..
    } = cli;

    match command {
        Commands::Chat => {
            let config = load_config(config.as_deref(), endpoint.as_deref())?;
            cmd_chat(&config).await
        }
        Commands::Send {
            message,
            agent,
            export,
        } => {
            let config = load_config(config.as_deref(), endpoint.as_deref())?;
            cmd_send(&config, &message, agent.as_deref(), export.as_deref()).await
        }
        Commands::Agents { format } => {
            let config = load_config(config.as_deref(), endpoint.as_deref())?;
            cmd_agents(&config, &format)
        }
        Commands::Actions => {
            let config = load_config(config.as_deref(), endpoint.as_deref())?;
            cmd_actions(&config)
        }
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn load_config(path: Option<&Path>, endpoint: Option<&str>) -> anyhow::Result<ConfabConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            ConfabConfig::load_from_paths(vec![path.to_path_buf()])?
        }
        None => ConfabConfig::load()?,
    };

    if let Some(endpoint) = endpoint {
        config.endpoint.base_url = endpoint.to_string();
        config.validate()?;
    }

    Ok(config)
}

fn cmd_actions(config: &ConfabConfig) -> anyhow::Result<()> {
    if config.quick_actions.is_empty() {
        println!("{}", "No quick actions configured.".yellow());
        return Ok(());
    }

    println!("{}", "Quick Actions".cyan().bold());
    println!();

    for (index, action) in config.quick_actions.iter().enumerate() {
        println!("  {}. {}", index + 1, action.label);
    }

    println!();
    println!(
        "{}",
        "Run 'confab chat' and type a number to send one.".dimmed()
    );

    Ok(())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Confab Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("confab {}", VERSION);
    }

    Ok(())
}
