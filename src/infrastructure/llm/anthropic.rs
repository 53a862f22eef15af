//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::errors::LlmBackendError;
use crate::domain::models::{ChatMessage, LlmConfig, SendResult};
use crate::domain::ports::{LlmBackend, ProgressIndicator, TestsAssembler};

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (read from ANTHROPIC_API_KEY when not set).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl AnthropicConfig {
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}

impl From<&LlmConfig> for AnthropicConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_URL.to_string()),
            model: config.model.clone(),
            api_version: ANTHROPIC_VERSION.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

/// Whether an API error message reports an oversized prompt.
pub fn is_prompt_too_long(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("prompt is too long")
        || message.contains("too many tokens")
        || message.contains("context")
}

/// Non-streaming client for `POST /v1/messages`.
pub struct AnthropicBackend {
    config: AnthropicConfig,
    api_key: String,
    client: Client,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmBackendError> {
        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmBackendError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        indicator: &dyn ProgressIndicator,
        assembler: &mut dyn TestsAssembler,
    ) -> SendResult {
        indicator.set_text("Waiting for Anthropic response");

        let response = match self
            .client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&self.build_request(messages))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Anthropic request failed");
                return SendResult::Other;
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return match response.json::<MessagesResponse>().await {
                Ok(body) => {
                    let text = body
                        .content
                        .iter()
                        .filter_map(|block| match block {
                            ContentBlock::Text { text } => Some(text.as_str()),
                            ContentBlock::Other => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    debug!(length = text.len(), "Anthropic responded");
                    assembler.consume(&text);
                    SendResult::Ok
                }
                Err(err) => {
                    warn!(error = %err, "Failed to decode Anthropic response");
                    SendResult::Other
                }
            };
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|error| error.error.message)
            .unwrap_or_else(|_| body.clone());

        if status == StatusCode::PAYLOAD_TOO_LARGE
            || (status == StatusCode::BAD_REQUEST && is_prompt_too_long(&message))
        {
            return SendResult::PromptTooLong;
        }

        warn!(%status, message = %message, "Anthropic returned an error");
        SendResult::Other
    }
}
