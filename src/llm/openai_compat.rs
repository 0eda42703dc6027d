//! OpenAI-compatible Chat Completions provider
//!
//! Works against any endpoint that speaks the OpenAI chat completions format
//! (OpenAI, DeepSeek, local gateways). Only the non-streaming path is used.
//!
//! SECURITY: Credentials are only sent to the configured endpoint.

use super::{
    ChatOptions, ContentPart, LlmError, LlmProvider, LlmResponse, Message, MessageContent, Role,
    TokenUsage, ToolCall, ToolDefinition,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Configuration Types
// ============================================================================

/// Authentication method for the API
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Bearer token in Authorization header
    BearerToken(String),
}

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Provider name used in logs
    pub name: String,
    /// Full chat completions endpoint
    pub endpoint: String,
    pub auth: AuthMethod,
    pub model: String,
    /// Maximum output tokens (omitted from the request when unset)
    pub max_tokens: Option<usize>,
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            auth,
            model: String::new(),
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic OpenAI-compatible provider
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    // ========================================================================
    // Message Conversion
    // ========================================================================

    /// Convert internal messages to OpenAI format
    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| {
                let role = msg.role.as_str().to_string();

                match &msg.content {
                    MessageContent::Text(text) => OpenAiMessage {
                        role,
                        content: Some(text.clone()),
                        tool_calls: None,
                        tool_call_id: msg.tool_call_id.clone(),
                    },
                    MessageContent::Parts(parts) => {
                        let tool_calls: Vec<OpenAiToolCall> = parts
                            .iter()
                            .filter_map(|p| {
                                if let ContentPart::ToolUse { id, name, input } = p {
                                    Some(OpenAiToolCall {
                                        id: id.clone(),
                                        call_type: "function".to_string(),
                                        function: OpenAiFunctionCall {
                                            name: name.clone(),
                                            arguments: input.to_string(),
                                        },
                                    })
                                } else {
                                    None
                                }
                            })
                            .collect();

                        let text_content = msg.content.as_text().map(str::to_string);

                        if !tool_calls.is_empty() && msg.role == Role::Assistant {
                            OpenAiMessage {
                                role,
                                content: text_content,
                                tool_calls: Some(tool_calls),
                                tool_call_id: None,
                            }
                        } else {
                            OpenAiMessage {
                                role,
                                content: text_content,
                                tool_calls: None,
                                tool_call_id: msg.tool_call_id.clone(),
                            }
                        }
                    }
                }
            })
            .collect()
    }

    /// Convert internal tool definitions to OpenAI format
    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                tool_type: "function".to_string(),
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    // ========================================================================
    // Request Building
    // ========================================================================

    fn build_request(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> OpenAiRequest {
        let mut request = OpenAiRequest {
            model: self.config.model.clone(),
            messages: self.convert_messages(messages),
            max_tokens: self.config.max_tokens,
            temperature: options.temperature,
            tools: None,
            tool_choice: None,
        };

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            request.tools = Some(self.convert_tools(tools));
            request.tool_choice = Some("auto".to_string());
        }

        request
    }

    /// Build request with authorization headers
    fn build_http_request(&self, body: &OpenAiRequest) -> reqwest::RequestBuilder {
        let AuthMethod::BearerToken(token) = &self.config.auth;
        self.client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
    }

    // ========================================================================
    // Response Parsing
    // ========================================================================

    fn parse_response(&self, response: OpenAiResponse) -> LlmResponse {
        let usage = response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let Some(choice) = response.choices.into_iter().next() else {
            tracing::warn!(provider = %self.config.name, "Response contained no choices");
            return LlmResponse::Text {
                text: String::new(),
                usage,
            };
        };

        let text = choice.message.content;
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect();

        if tool_calls.is_empty() {
            LlmResponse::Text {
                text: text.unwrap_or_default(),
                usage,
            }
        } else if text.as_deref().map(str::is_empty).unwrap_or(true) {
            LlmResponse::ToolCalls {
                calls: tool_calls,
                usage,
            }
        } else {
            LlmResponse::Mixed {
                text,
                tool_calls,
                usage,
            }
        }
    }

    // ========================================================================
    // API Methods
    // ========================================================================

    async fn chat_impl(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        tracing::debug!(
            target: "llm",
            provider = %self.config.name,
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.map(|t| t.len()).unwrap_or(0),
            "Sending chat request"
        );

        let request = self.build_request(messages, tools, options);
        let response = self
            .build_http_request(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = %self.config.name,
                status = %status,
                "Chat request failed: {}",
                error_text
            );
            return Err(LlmError::from_http_status(status, error_text).into());
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.config.name))?;

        let parsed = self.parse_response(api_response);
        if let Some(usage) = parsed.usage() {
            tracing::debug!(
                target: "llm",
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Chat request completed"
            );
        }
        Ok(parsed)
    }
}

// ============================================================================
// LlmProvider Implementation
// ============================================================================

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse> {
        self.chat_impl(messages, tools, &ChatOptions::default())
            .await
    }

    async fn chat_with_options(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        self.chat_impl(messages, tools, options).await
    }
}

// ============================================================================
// API Types (OpenAI Format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ============================================================================
// Tests
// ============================================================================
