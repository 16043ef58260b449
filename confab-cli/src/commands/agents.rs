use colored::Colorize;
use confab_core::ConfabConfig;

use crate::output;

pub fn cmd_agents(config: &ConfabConfig, format: &str) -> anyhow::Result<()> {
    let roster = config.roster();

    if format == "json" {
        let output: Vec<serde_json::Value> = roster
            .iter()
            .map(|agent| {
                serde_json::json!({
                    "id": agent.id,
                    "name": agent.name,
                    "icon": agent.icon,
                    "status": agent.status.to_string(),
                    "description": agent.description,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if roster.is_empty() {
        println!("{}", "No agents configured.".yellow());
        println!(
            "{}",
            "Add an [[agents]] section to confab.toml to define the roster.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Configured Agents".cyan().bold());
    println!();

    let table = output::roster_table(&roster);
    println!("{table}");
    println!();
    println!("  Total: {} agents", roster.len());

    Ok(())
}
