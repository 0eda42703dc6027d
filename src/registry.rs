//! Name-indexed set of agents, built once at startup
//!
//! The registry is read-only after construction and shared as `Arc<AgentRegistry>`;
//! all mutable state lives inside each agent's conversation log.

use crate::agent::{Agent, AgentSummary, SimpleChatAgent, ToolAgent};
use crate::config::Config;
use crate::llm;
use crate::utils::validate_agent_name;
use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Agent '{0}' does not exist")]
    AgentNotFound(String),

    #[error("Invalid agent name '{0}': must start with a letter and contain only letters, digits and underscores")]
    InvalidAgentName(String),

    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),
}

/// Per-agent counters reported by `GET /stats`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgentStats {
    pub name: String,
    pub display_name: String,
    pub conversation_count: usize,
    pub total_messages: usize,
    pub last_activity: Option<String>,
}

pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Build the standard agent set from configuration
    ///
    /// A missing API key is not an error: the agents are built unconfigured and
    /// answer with a fixed explanation.
    pub fn initialize(config: &Config) -> Result<Self> {
        let provider = llm::create_provider(&config.llm)?;

        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(
                SimpleChatAgent::new(provider.clone())
                    .with_max_history(config.agent.max_history),
            ),
            Arc::new(
                ToolAgent::new(provider)
                    .with_max_history(config.agent.max_history)
                    .with_max_iterations(config.agent.max_iterations),
            ),
        ];

        let registry = Self::from_agents(agents)?;
        tracing::info!(
            agents = registry.len(),
            "Agent registry initialized: {}",
            registry.names().join(", ")
        );
        Ok(registry)
    }

    /// Register agents in order, rejecting malformed or repeated names
    pub fn from_agents(agents: Vec<Arc<dyn Agent>>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(agents.len());
        for (position, agent) in agents.iter().enumerate() {
            let name = agent.name();
            if !validate_agent_name(name) {
                return Err(RegistryError::InvalidAgentName(name.to_string()));
            }
            if index.insert(name.to_string(), position).is_some() {
                return Err(RegistryError::DuplicateAgent(name.to_string()));
            }
        }
        Ok(Self { agents, index })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.index.get(name).map(|&i| Arc::clone(&self.agents[i]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Agent names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Summaries in registration order
    pub fn list(&self) -> Vec<AgentSummary> {
        self.agents.iter().map(|a| a.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Route a message to the named agent
    pub async fn dispatch(
        &self,
        agent_name: &str,
        message: &str,
        conversation_id: &str,
    ) -> Result<String, RegistryError> {
        let agent = self
            .get(agent_name)
            .ok_or_else(|| RegistryError::AgentNotFound(agent_name.to_string()))?;
        Ok(agent.process_message(message, conversation_id).await)
    }

    /// Clear one conversation; false when the agent or conversation is unknown
    pub fn clear_conversation(&self, agent_name: &str, conversation_id: &str) -> bool {
        self.get(agent_name)
            .map(|agent| agent.clear_conversation(conversation_id))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> BTreeMap<String, AgentStats> {
        self.agents
            .iter()
            .map(|agent| {
                let info = agent.info();
                (
                    info.name.clone(),
                    AgentStats {
                        name: info.name,
                        display_name: info.display_name,
                        conversation_count: info.conversation_count,
                        total_messages: info.total_messages,
                        last_activity: info.last_activity,
                    },
                )
            })
            .collect()
    }
}
