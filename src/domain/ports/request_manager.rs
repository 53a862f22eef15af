//! Model transport ports.
//!
//! `RequestManager` is what the feedback cycle talks to. `LlmBackend` is the
//! thinner vendor-specific contract a request manager drives.

use async_trait::async_trait;

use crate::domain::models::{ChatMessage, LlmResponse, SendResult};
use crate::domain::ports::{ProgressIndicator, TestsAssembler};

/// Sends a prompt and classifies the answer.
#[async_trait]
pub trait RequestManager: Send {
    /// Send `prompt`; the raw answer is streamed into `assembler`.
    ///
    /// A suite is assembled and returned only when the response is `Ok`.
    async fn request(
        &mut self,
        prompt: &str,
        indicator: &dyn ProgressIndicator,
        package_name: &str,
        assembler: &mut dyn TestsAssembler,
    ) -> LlmResponse;
}

/// Vendor-specific chat endpoint.
///
/// Implementations must be `Send + Sync` for use across tokio tasks.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend identifier, e.g. "ollama".
    fn name(&self) -> &'static str;

    /// Send the conversation and push the assistant text into `assembler`.
    async fn send(
        &self,
        messages: &[ChatMessage],
        indicator: &dyn ProgressIndicator,
        assembler: &mut dyn TestsAssembler,
    ) -> SendResult;
}
