//! Conversational agents
//!
//! An [`Agent`] turns one inbound message into one reply and keeps the exchange in
//! its own [`ConversationLog`]. Two variants exist:
//! - [`SimpleChatAgent`]: sends the stored history to the model in a single call
//! - [`ToolAgent`]: lets the model call the built-in tools before answering

mod history;
mod simple_chat;
mod tool_agent;

pub use history::{ConversationLog, HistoryMessage, HistoryRole, DEFAULT_MAX_HISTORY};
pub use simple_chat::SimpleChatAgent;
pub use tool_agent::{ToolAgent, DEFAULT_MAX_ITERATIONS, ITERATION_LIMIT_REPLY};

use crate::utils::{format_timestamp, truncate_text};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Reply given when no upstream API key was configured at startup
pub const NOT_CONFIGURED_REPLY: &str = "Sorry, this agent is not configured and cannot process your message. Please set the OPENAI_API_KEY environment variable.";

const PREVIEW_CHARS: usize = 50;

/// Fixed identity of an agent
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub created_at: DateTime<Local>,
}

impl AgentProfile {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            version: "1.0.0".to_string(),
            created_at: Local::now(),
        }
    }
}

/// Listing entry for `GET /agents`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgentSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub capabilities: Vec<String>,
}

/// Full description including live conversation counters
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub conversation_count: usize,
    pub total_messages: usize,
    pub created_at: String,
    pub last_activity: Option<String>,
}

/// A conversational backend
///
/// Implementors supply [`Agent::generate`]; the provided
/// [`Agent::process_message`] handles history bookkeeping and turns every failure
/// into a reply string.
#[async_trait]
pub trait Agent: Send + Sync {
    fn profile(&self) -> &AgentProfile;

    fn capabilities(&self) -> &[&'static str];

    fn conversations(&self) -> &ConversationLog;

    /// False when the agent was built without an upstream provider
    fn is_configured(&self) -> bool;

    /// Produce a reply for a conversation whose latest record is the user message
    async fn generate(&self, conversation_id: &str) -> Result<String>;

    fn name(&self) -> &str {
        &self.profile().name
    }

    /// Handle one inbound message; never fails
    async fn process_message(&self, message: &str, conversation_id: &str) -> String {
        if !self.is_configured() {
            return NOT_CONFIGURED_REPLY.to_string();
        }

        let log = self.conversations();
        log.append(conversation_id, HistoryRole::User, message);

        match self.generate(conversation_id).await {
            Ok(reply) => {
                log.append(conversation_id, HistoryRole::Assistant, reply.as_str());
                tracing::info!(
                    agent = %self.name(),
                    conversation = %conversation_id,
                    "Processed message: {} -> {}",
                    truncate_text(message, PREVIEW_CHARS),
                    truncate_text(&reply, PREVIEW_CHARS)
                );
                reply
            }
            Err(e) => {
                tracing::error!(
                    agent = %self.name(),
                    conversation = %conversation_id,
                    "Failed to process message: {:#}",
                    e
                );
                format!(
                    "Sorry, an error occurred while processing your message: {}",
                    e
                )
            }
        }
    }

    fn history(&self, conversation_id: &str) -> Vec<HistoryMessage> {
        self.conversations().get(conversation_id)
    }

    fn clear_conversation(&self, conversation_id: &str) -> bool {
        let cleared = self.conversations().clear(conversation_id);
        if cleared {
            tracing::info!(agent = %self.name(), conversation = %conversation_id, "Cleared conversation");
        }
        cleared
    }

    fn conversation_count(&self) -> usize {
        self.conversations().count()
    }

    fn total_messages(&self) -> usize {
        self.conversations().total_messages()
    }

    fn summary(&self) -> AgentSummary {
        let profile = self.profile();
        AgentSummary {
            name: profile.name.clone(),
            display_name: profile.display_name.clone(),
            description: profile.description.clone(),
            version: profile.version.clone(),
            capabilities: self.capabilities().iter().map(|c| c.to_string()).collect(),
        }
    }

    fn info(&self) -> AgentInfo {
        let profile = self.profile();
        let log = self.conversations();
        AgentInfo {
            name: profile.name.clone(),
            display_name: profile.display_name.clone(),
            description: profile.description.clone(),
            version: profile.version.clone(),
            capabilities: self.capabilities().iter().map(|c| c.to_string()).collect(),
            conversation_count: log.count(),
            total_messages: log.total_messages(),
            created_at: format_timestamp(&profile.created_at),
            last_activity: log.last_activity().as_ref().map(format_timestamp),
        }
    }
}

/// Map stored history to model messages, oldest first
pub(crate) fn history_to_messages(history: &[HistoryMessage]) -> Vec<crate::llm::Message> {
    use crate::llm::Message;

    history
        .iter()
        .map(|record| match record.role {
            HistoryRole::User => Message::user(record.content.as_str()),
            HistoryRole::Assistant => Message::assistant(record.content.as_str()),
        })
        .collect()
}
