//! CLI transport: one-shot commands that talk to the registry directly

use crate::config::Config;
use crate::registry::AgentRegistry;
use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Capabilities")]
    capabilities: String,
}

/// Print the registered agents as a table
pub fn run_list_agents(config: &Config) -> Result<()> {
    let registry = AgentRegistry::initialize(config)?;

    println!("\n{}", "=== AVAILABLE AGENTS ===".bold().cyan());
    println!();

    let rows: Vec<AgentRow> = registry
        .list()
        .into_iter()
        .map(|agent| AgentRow {
            name: agent.name,
            display_name: agent.display_name,
            version: agent.version,
            capabilities: agent.capabilities.join(", "),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if !config.llm.is_configured() {
        println!(
            "\n{}",
            "OPENAI_API_KEY is not set; agents will reply with a configuration notice."
                .yellow()
        );
    }
    println!();
    Ok(())
}

/// Send one message to an agent and print the reply
pub async fn run_chat_once(
    config: &Config,
    message: &str,
    agent_name: Option<&str>,
    conversation_id: &str,
) -> Result<()> {
    let registry = AgentRegistry::initialize(config)?;
    let agent_name = agent_name.unwrap_or(config.agent.default_agent.as_str());

    let reply = registry
        .dispatch(agent_name, message, conversation_id)
        .await
        .with_context(|| format!("Available agents: {}", registry.names().join(", ")))?;

    println!("{} {}", format!("[{}]", agent_name).bold().green(), reply);
    Ok(())
}
