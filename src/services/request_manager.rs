//! Chat-history request manager on top of an [`LlmBackend`].

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::models::{ChatMessage, LlmResponse, ResponseErrorCode, SendResult};
use crate::domain::ports::{LlmBackend, ProgressIndicator, RequestManager, TestsAssembler};

/// Keeps the conversation so corrective prompts refer to earlier answers.
pub struct ChatRequestManager<B: LlmBackend> {
    backend: B,
    history: Vec<ChatMessage>,
}

impl<B: LlmBackend> ChatRequestManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            history: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

#[async_trait]
impl<B: LlmBackend> RequestManager for ChatRequestManager<B> {
    async fn request(
        &mut self,
        prompt: &str,
        indicator: &dyn ProgressIndicator,
        package_name: &str,
        assembler: &mut dyn TestsAssembler,
    ) -> LlmResponse {
        debug!(backend = self.backend.name(), "Sending request to LLM");
        indicator.set_text("Sending request to LLM");

        self.history.push(ChatMessage::user(prompt));
        let send_result = self.backend.send(&self.history, indicator, assembler).await;

        if send_result == SendResult::PromptTooLong {
            self.history.pop();
            return LlmResponse::error(ResponseErrorCode::PromptTooLong);
        }

        let content = assembler.content().to_string();
        if !content.is_empty() {
            self.history.push(ChatMessage::assistant(content.as_str()));
        }

        if send_result == SendResult::Other || content.trim().is_empty() {
            warn!(backend = self.backend.name(), "LLM returned no content");
            return LlmResponse::error(ResponseErrorCode::EmptyLlmResponse);
        }

        match assembler.assemble_test_suite(package_name) {
            Some(test_suite) => LlmResponse::ok(test_suite),
            None => LlmResponse::error(ResponseErrorCode::TestSuiteParsingFailure),
        }
    }
}
