//! Tool-augmented agent
//!
//! Runs the model in a loop: each turn it either answers or asks for tool calls,
//! whose results are fed back as tool messages. Tool traffic lives only in the
//! per-request message list; the conversation log keeps user and assistant turns.

use super::{history_to_messages, Agent, AgentProfile, ConversationLog};
use crate::llm::{ChatOptions, LlmProvider, LlmResponse, Message};
use crate::tools;
use crate::utils::truncate_text;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Reply when the model is still calling tools after the last allowed turn
pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit or time limit.";

const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that can use tools to help the user. \
Choose the appropriate tool for the user's question: get_current_time for the date and time, \
calculate for arithmetic, search_weather for the weather in a city. \
Answer directly when no tool is needed.";

const CAPABILITIES: &[&str] = &[
    "Conversation",
    "Tool calling",
    "Time lookup",
    "Arithmetic",
    "Weather lookup",
    "Multi-turn dialogue",
];

pub struct ToolAgent {
    profile: AgentProfile,
    llm: Option<Arc<dyn LlmProvider>>,
    conversations: ConversationLog,
    max_iterations: usize,
}

impl ToolAgent {
    pub const NAME: &'static str = "tool_agent";

    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        let profile = AgentProfile::new(
            Self::NAME,
            "Smart Assistant",
            "Assistant that can call tools to tell the time, do arithmetic and look up the weather",
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
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.conversations = ConversationLog::with_max_history(max_history);
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

#[async_trait]
impl Agent for ToolAgent {
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

        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend(history_to_messages(
            &self.conversations.get(conversation_id),
        ));

        let tool_definitions = tools::definitions();
        let options = ChatOptions::with_temperature(TEMPERATURE);

        for iteration in 1..=self.max_iterations {
            let response = llm
                .chat_with_options(&messages, Some(&tool_definitions), &options)
                .await?;

            let calls = response.tool_calls();
            if calls.is_empty() {
                tracing::debug!(agent = Self::NAME, iteration, "Model answered");
                return Ok(response.text().unwrap_or_default().to_string());
            }

            let text = match &response {
                LlmResponse::Mixed { text, .. } => text.clone(),
                _ => None,
            };
            messages.push(Message::assistant_tool_calls(text, calls));

            for call in calls {
                let result = tools::execute_call(call);
                if result.success {
                    tracing::debug!(
                        agent = Self::NAME,
                        iteration,
                        tool = %call.name,
                        "Tool result: {}",
                        truncate_text(&result.output, 200)
                    );
                } else {
                    tracing::warn!(
                        agent = Self::NAME,
                        iteration,
                        tool = %call.name,
                        args = %call.arguments,
                        "Tool call failed: {}",
                        result.output
                    );
                }
                messages.push(Message::tool_result(call.id.as_str(), result.output));
            }
        }

        tracing::warn!(
            agent = Self::NAME,
            max_iterations = self.max_iterations,
            "Tool loop hit the iteration limit"
        );
        Ok(ITERATION_LIMIT_REPLY.to_string())
    }
}
