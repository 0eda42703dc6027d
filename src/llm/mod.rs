//! LLM provider abstraction and the OpenAI-compatible client

use crate::config::LlmConfig;

mod error;
mod openai_compat;
mod types;

pub use error::LlmError;
pub use openai_compat::{AuthMethod, OpenAiCompatConfig, OpenAiCompatProvider};
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Model identifier sent upstream
    fn model(&self) -> &str {
        ""
    }

    /// Send a chat completion request (non-streaming)
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse>;

    /// Send a chat completion request with generation options
    ///
    /// Providers that cannot honour the options fall back to `chat()`.
    async fn chat_with_options(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        let _ = options;
        self.chat(messages, tools).await
    }
}

/// Build the shared provider from configuration
///
/// Returns `Ok(None)` when no API key is configured; agents built without a
/// provider stay unconfigured for the life of the process.
pub fn create_provider(config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>> {
    let Some(api_key) = config.api_key.as_ref().filter(|_| config.is_configured()) else {
        tracing::warn!("OPENAI_API_KEY is not set; agents will run unconfigured");
        return Ok(None);
    };

    let endpoint = chat_completions_url(&config.api_base)?;
    let mut compat = OpenAiCompatConfig::new(
        "openai",
        endpoint,
        AuthMethod::BearerToken(api_key.trim().to_string()),
    )
    .with_model(&config.model)
    .with_timeout(Duration::from_secs(config.timeout_secs));
    if let Some(max_tokens) = config.max_tokens {
        compat = compat.with_max_tokens(max_tokens);
    }

    let provider = OpenAiCompatProvider::new(compat)?;
    tracing::info!(
        endpoint = provider.endpoint(),
        model = provider.model(),
        "Created OpenAI-compatible provider"
    );
    Ok(Some(Arc::new(provider)))
}

/// Resolve a configured base URL to its chat completions endpoint
///
/// Accepts either a bare base (`https://api.deepseek.com`, `.../v1`) or a full
/// endpoint that already ends in `/chat/completions`.
pub fn chat_completions_url(api_base: &str) -> Result<String> {
    let base = api_base.trim().trim_end_matches('/');
    if base.is_empty() {
        return Ok("https://api.openai.com/v1/chat/completions".to_string());
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("Invalid API base URL '{}': expected http(s) scheme", api_base);
    }
    if base.ends_with("/chat/completions") {
        Ok(base.to_string())
    } else {
        Ok(format!("{}/chat/completions", base))
    }
}
