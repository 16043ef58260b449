use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{ConfabError, ConfabResult};
use crate::log::DEFAULT_CLEAR_NOTICE;
use crate::models::AgentDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfabConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default = "default_roster")]
    pub agents: Vec<AgentSeed>,

    #[serde(default = "default_quick_actions")]
    pub quick_actions: Vec<QuickAction>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    #[serde(default = "default_clear_notice")]
    pub clear_notice: String,
}

/// One roster entry as configured; statuses always start online.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSeed {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub description: String,
}

impl From<&AgentSeed> for AgentDescriptor {
    fn from(seed: &AgentSeed) -> Self {
        AgentDescriptor::new(
            seed.id.clone(),
            seed.name.clone(),
            seed.icon.clone(),
            seed.description.clone(),
        )
    }
}

/// Canned prompt: `label` is shown in menus, `message` is what gets sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickAction {
    pub label: String,
    pub message: String,
}

impl QuickAction {
    fn new(label: &str, message: &str) -> Self {
        Self {
            label: label.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_welcome_message() -> String {
    "Welcome to the Multi-Agent AI System! Ask me anything about SpaceX launches, \
     weather, or let me coordinate multiple agents for complex tasks."
        .to_string()
}

fn default_clear_notice() -> String {
    DEFAULT_CLEAR_NOTICE.to_string()
}

fn default_roster() -> Vec<AgentSeed> {
    vec![
        AgentSeed {
            id: "spacex".to_string(),
            name: "SpaceX Agent".to_string(),
            icon: "🚀".to_string(),
            description: "Handles SpaceX launch data and mission information".to_string(),
        },
        AgentSeed {
            id: "weather".to_string(),
            name: "Weather Agent".to_string(),
            icon: "🌍".to_string(),
            description: "Provides weather data and forecasts".to_string(),
        },
        AgentSeed {
            id: "summary".to_string(),
            name: "Summary Agent".to_string(),
            icon: "📝".to_string(),
            description: "Creates intelligent summaries and analysis".to_string(),
        },
        AgentSeed {
            id: "google_adk".to_string(),
            name: "Google ADK".to_string(),
            icon: "🧠".to_string(),
            description: "AI-powered coordination and validation".to_string(),
        },
        AgentSeed {
            id: "system".to_string(),
            name: "System".to_string(),
            icon: "⚙️".to_string(),
            description: "System messages and coordination".to_string(),
        },
    ]
}

fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new("🚀 Find next SpaceX launch", "Find next SpaceX launch"),
        QuickAction::new("🌤️ Check weather conditions", "Check weather conditions"),
        QuickAction::new("📊 Analyze launch readiness", "Analyze launch readiness"),
        QuickAction::new("📝 Get mission summary", "Get mission summary"),
        QuickAction::new("💾 Show raw data", "Show raw data"),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConfabConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            chat: ChatConfig::default(),
            agents: default_roster(),
            quick_actions: default_quick_actions(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            clear_notice: default_clear_notice(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ConfabConfig {
    pub fn load() -> ConfabResult<Self> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> ConfabResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("CONFAB")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut confab_config: ConfabConfig = config.try_deserialize()?;

        // Nested keys with underscores cannot be addressed through the
        // environment source, so the common overrides are applied by hand.
        if let Ok(url) = std::env::var("CONFAB_ENDPOINT") {
            confab_config.endpoint.base_url = url;
        }

        if let Ok(level) = std::env::var("CONFAB_LOG_LEVEL") {
            confab_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            confab_config.logging.level = level;
        }

        confab_config.validate()?;

        Ok(confab_config)
    }

    pub fn validate(&self) -> ConfabResult<()> {
        if self.endpoint.base_url.is_empty() {
            return Err(ConfabError::InvalidConfigValue {
                key: "endpoint.base_url".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if !self.endpoint.base_url.starts_with("http://")
            && !self.endpoint.base_url.starts_with("https://")
        {
            return Err(ConfabError::InvalidConfigValue {
                key: "endpoint.base_url".to_string(),
                message: "Must be a URL starting with http:// or https://".to_string(),
            });
        }

        if self.endpoint.request_timeout_secs == 0 {
            return Err(ConfabError::InvalidConfigValue {
                key: "endpoint.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        for (index, agent) in self.agents.iter().enumerate() {
            if agent.id.is_empty() {
                return Err(ConfabError::InvalidConfigValue {
                    key: format!("agents[{}].id", index),
                    message: "Must not be empty".to_string(),
                });
            }
            if self.agents.iter().filter(|other| other.id == agent.id).count() > 1 {
                return Err(ConfabError::InvalidConfigValue {
                    key: format!("agents[{}].id", index),
                    message: format!("Duplicate agent id '{}'", agent.id),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfabError::InvalidConfigValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Roster descriptors in configured order, all starting online.
    pub fn roster(&self) -> Vec<AgentDescriptor> {
        self.agents.iter().map(AgentDescriptor::from).collect()
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("confab.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("confab").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".confab").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("confab").join(".env"));
    }

    paths
}
