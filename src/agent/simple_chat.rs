//! Direct chat agent: the whole stored conversation goes out in one request

use super::{history_to_messages, Agent, AgentProfile, ConversationLog};
use crate::llm::LlmProvider;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

const CAPABILITIES: &[&str] = &[
    "Basic conversation",
    "Question answering",
    "Text generation",
    "Multi-turn dialogue",
];

pub struct SimpleChatAgent {
    profile: AgentProfile,
    llm: Option<Arc<dyn LlmProvider>>,
    conversations: ConversationLog,
}

impl SimpleChatAgent {
    pub const NAME: &'static str = "simple_chat";

    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        let profile = AgentProfile::new(
            Self::NAME,
            "Simple Chat",
            "Plain chat with the language model, suited to everyday conversation and quick questions",
        );
        tracing::info!(
            agent = %profile.name,
            configured = llm.is_some(),
            "Initialized agent {}",
            profile.display_name
        );
        Self {
            profile,
            llm,
            conversations: ConversationLog::new(),
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.conversations = ConversationLog::with_max_history(max_history);
        self
    }
}

#[async_trait]
impl Agent for SimpleChatAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn capabilities(&self) -> &[&'static str] {
        CAPABILITIES
    }

    fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    async fn generate(&self, conversation_id: &str) -> Result<String> {
        let Some(llm) = &self.llm else {
            bail!("no language model provider configured");
        };

        let messages = history_to_messages(&self.conversations.get(conversation_id));
        tracing::debug!(
            agent = Self::NAME,
            messages = messages.len(),
            "Sending conversation to {}",
            llm.name()
        );

        let response = llm.chat(&messages, None).await?;
        match response.text() {
            Some(text) => Ok(text.to_string()),
            None => bail!("model returned no text content"),
        }
    }
}
