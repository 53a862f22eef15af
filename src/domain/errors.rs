//! Domain errors for the testsmith generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Domain-level errors that can occur while generating tests.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Template misuse reported by the prompt builder.
///
/// These indicate a broken template, never a bad model answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("The prompt must contain {0}")]
    MissingKeyword(&'static str),

    #[error("The prompt must contain {code} or {declarations}")]
    MissingCodeKeyword {
        code: &'static str,
        declarations: &'static str,
    },
}

/// Errors raised by the compilation verifier.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// No compiler executable below the toolchain root. Fatal, never retried.
    #[error("Cannot find java compiler '{binary}' at '{}'", root.display())]
    CompilerNotFound { binary: &'static str, root: PathBuf },

    #[error("Failed to run command `{command}`: {message}")]
    Io { command: String, message: String },
}

/// Errors raised by the artifact recorder.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Failed to access artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact container {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by LLM backends before a response can be classified.
#[derive(Debug, Error)]
pub enum LlmBackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Model {model} is not supported. Supported models are: {supported}")]
    UnsupportedModel { model: String, supported: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LlmBackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmBackendError::Decode(err.to_string())
        } else {
            LlmBackendError::Network(err.to_string())
        }
    }
}

/// Fatal errors that escape the feedback cycle.
///
/// Every expected termination is a `FeedbackCycleExecutionResult`; only
/// conditions no prompt mutation can repair end up here.
#[derive(Debug, Error)]
pub enum FeedbackCycleError {
    #[error("Invalid feedback cycle setup: {0}")]
    InvalidSetup(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Compiler(#[from] CompilerError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}
