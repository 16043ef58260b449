use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use confab_core::models::{AgentDescriptor, AgentStatus, Message, MessageContent, MessageRole};
use confab_core::registry::StatusChange;

/// Id-to-descriptor lookup used when rendering attributed messages.
pub fn roster_index(roster: &[AgentDescriptor]) -> HashMap<String, AgentDescriptor> {
    roster
        .iter()
        .map(|agent| (agent.id.clone(), agent.clone()))
        .collect()
}

/// One transcript message as a printable line (or block, for raw data).
pub fn render_message(message: &Message, roster: &HashMap<String, AgentDescriptor>) -> String {
    let time = message.created_at.format("%H:%M:%S");
    let label = match message.role {
        MessageRole::User => "You".green().bold().to_string(),
        MessageRole::Agent => agent_label(message.agent_id.as_deref(), roster)
            .cyan()
            .bold()
            .to_string(),
        MessageRole::System => "System".yellow().to_string(),
    };

    match &message.content {
        MessageContent::Text { text } => format!("[{}] {}: {}", time, label, text),
        MessageContent::DataBlock { title, payload } => {
            let pretty =
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            let indented = pretty
                .lines()
                .map(|line| format!("    {}", line))
                .collect::<Vec<_>>()
                .join("\n");
            format!("[{}] {}: {}\n{}", time, label, title.bold(), indented)
        }
    }
}

pub fn render_status_change(
    change: &StatusChange,
    roster: &HashMap<String, AgentDescriptor>,
) -> String {
    let name = roster
        .get(&change.agent_id)
        .map(|agent| format!("{} {}", agent.icon, agent.name))
        .unwrap_or_else(|| change.agent_id.clone());

    match change.status {
        AgentStatus::Busy => format!("  {} {}", name, "is working...".yellow()),
        AgentStatus::Online => format!("  {} {}", name, "is ready".green()),
    }
}

pub fn roster_table(roster: &[AgentDescriptor]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Agent").fg(Color::White),
            Cell::new("Id").fg(Color::White),
            Cell::new("Status").fg(Color::White),
            Cell::new("Description").fg(Color::White),
        ]);

    for agent in roster {
        let status_cell = match agent.status {
            AgentStatus::Online => Cell::new("Online").fg(Color::Green),
            AgentStatus::Busy => Cell::new("Busy").fg(Color::Yellow),
        };

        table.add_row(vec![
            Cell::new(format!("{} {}", agent.icon, agent.name)),
            Cell::new(&agent.id),
            status_cell,
            Cell::new(&agent.description),
        ]);
    }

    table
}

fn agent_label(agent_id: Option<&str>, roster: &HashMap<String, AgentDescriptor>) -> String {
    match agent_id.and_then(|id| roster.get(id)) {
        Some(agent) => format!("{} {}", agent.icon, agent.name),
        None => agent_id.unwrap_or("Agent").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_roster() -> HashMap<String, AgentDescriptor> {
        roster_index(&[AgentDescriptor::new(
            "spacex",
            "SpaceX Agent",
            "🚀",
            "Launch data",
        )])
    }

    #[test]
    fn test_render_user_message() {
        let message = Message::new(MessageContent::text("hello"), MessageRole::User, None);

        let rendered = render_message(&message, &test_roster());
        assert!(rendered.contains("You"));
        assert!(rendered.contains("hello"));
    }

    #[test]
    fn test_render_attributed_agent_message() {
        let message = Message::new(
            MessageContent::text("Checking launch data..."),
            MessageRole::Agent,
            Some("spacex".to_string()),
        );

        let rendered = render_message(&message, &test_roster());
        assert!(rendered.contains("SpaceX Agent"));
        assert!(rendered.contains("Checking launch data..."));
    }

    #[test]
    fn test_render_data_block_indents_payload() {
        let message = Message::new(
            MessageContent::data_block("Raw API Data", json!({ "launch_id": 42 })),
            MessageRole::System,
            None,
        );

        let rendered = render_message(&message, &test_roster());
        assert!(rendered.contains("Raw API Data"));
        assert!(rendered.contains("\"launch_id\": 42"));
    }

    #[test]
    fn test_roster_table_lists_agents() {
        let roster = vec![
            AgentDescriptor::new("spacex", "SpaceX Agent", "🚀", "Launch data"),
            AgentDescriptor::new("weather", "Weather Agent", "🌍", "Forecasts")
                .with_status(AgentStatus::Busy),
        ];

        let table = roster_table(&roster).to_string();
        assert!(table.contains("SpaceX Agent"));
        assert!(table.contains("Online"));
        assert!(table.contains("Busy"));
    }

    #[test]
    fn test_render_status_change_lines() {
        let roster = test_roster();

        let busy = render_status_change(
            &StatusChange {
                agent_id: "spacex".to_string(),
                status: AgentStatus::Busy,
            },
            &roster,
        );
        assert!(busy.contains("SpaceX Agent"));
        assert!(busy.contains("working"));

        let online = render_status_change(
            &StatusChange {
                agent_id: "spacex".to_string(),
                status: AgentStatus::Online,
            },
            &roster,
        );
        assert!(online.contains("ready"));
    }
}
