//! Stub providers shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use arena_gateway::llm::{
    ChatOptions, LlmProvider, LlmResponse, Message, Role, ToolCall, ToolDefinition,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replies with the text of the last user message
pub struct EchoProvider;

#[async_trait]
impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn chat(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse> {
        let text = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.as_text())
            .unwrap_or_default()
            .to_string();
        Ok(LlmResponse::Text { text, usage: None })
    }
}

/// Always fails, as an unreachable upstream would
pub struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn chat(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse> {
        anyhow::bail!("upstream unavailable")
    }
}

/// Returns queued responses in order and records every request
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    requests: Mutex<Vec<Vec<Message>>>,
    temperatures: Mutex<Vec<Option<f32>>>,
    /// Returned once the queue is empty
    fallback: Option<LlmResponse>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
            fallback: None,
        }
    }

    /// Keep answering with `response` forever
    pub fn repeating(response: LlmResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<Option<f32>> {
        self.temperatures.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse> {
        self.chat_with_options(messages, tools, &ChatOptions::default())
            .await
    }

    async fn chat_with_options(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.temperatures.lock().unwrap().push(options.temperature);
        let next = self.responses.lock().unwrap().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(response) => Ok(response),
            None => anyhow::bail!("script exhausted"),
        }
    }
}

pub fn text(text: &str) -> LlmResponse {
    LlmResponse::Text {
        text: text.to_string(),
        usage: None,
    }
}

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> LlmResponse {
    LlmResponse::ToolCalls {
        calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        usage: None,
    }
}
