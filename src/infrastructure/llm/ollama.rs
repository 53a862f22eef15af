//! Ollama chat backend.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::errors::LlmBackendError;
use crate::domain::models::{ChatMessage, LlmConfig, SendResult};
use crate::domain::ports::{LlmBackend, ProgressIndicator, TestsAssembler};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Models known to follow the test generation prompts.
pub const SUPPORTED_OLLAMA_MODELS: [&str; 2] = ["llama3.2", "llama3.2:1b"];

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: SUPPORTED_OLLAMA_MODELS[0].to_string(),
            temperature: 0.0,
            timeout_secs: 300,
        }
    }
}

impl From<&LlmConfig> for OllamaConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
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
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

/// Non-streaming client for `POST /api/chat`.
pub struct OllamaBackend {
    config: OllamaConfig,
    client: Client,
}

impl OllamaBackend {
    /// Rejects models outside [`SUPPORTED_OLLAMA_MODELS`].
    pub fn new(config: OllamaConfig) -> Result<Self, LlmBackendError> {
        if !SUPPORTED_OLLAMA_MODELS.contains(&config.model.as_str()) {
            return Err(LlmBackendError::UnsupportedModel {
                model: config.model,
                supported: SUPPORTED_OLLAMA_MODELS.join(", "),
            });
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        indicator: &dyn ProgressIndicator,
        assembler: &mut dyn TestsAssembler,
    ) -> SendResult {
        indicator.set_text("Waiting for Ollama response");

        let response = match self
            .client
            .post(format!("{}/api/chat", self.config.base_url.trim_end_matches('/')))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&self.build_request(messages))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Ollama request failed");
                return SendResult::Other;
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<ChatResponse>().await {
                Ok(body) => {
                    debug!(length = body.message.content.len(), "Ollama responded");
                    assembler.consume(&body.message.content);
                    SendResult::Ok
                }
                Err(err) => {
                    warn!(error = %err, "Failed to decode Ollama response");
                    SendResult::Other
                }
            },
            StatusCode::BAD_REQUEST => SendResult::PromptTooLong,
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(%status, body = %body, "Ollama returned an error");
                SendResult::Other
            }
        }
    }
}
