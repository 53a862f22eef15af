use serde::{Deserialize, Serialize};

use super::test_suite::TestSuiteGeneratedByLlm;

/// Classification of a model response as seen by the feedback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseErrorCode {
    Ok,
    PromptTooLong,
    EmptyLlmResponse,
    TestSuiteParsingFailure,
}

/// A classified model response; `test_suite` is set only for `Ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub error_code: ResponseErrorCode,
    pub test_suite: Option<TestSuiteGeneratedByLlm>,
}

impl LlmResponse {
    pub fn ok(test_suite: TestSuiteGeneratedByLlm) -> Self {
        Self {
            error_code: ResponseErrorCode::Ok,
            test_suite: Some(test_suite),
        }
    }

    pub fn error(error_code: ResponseErrorCode) -> Self {
        Self {
            error_code,
            test_suite: None,
        }
    }
}

/// Transport-level outcome reported by an LLM backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendResult {
    Ok,
    PromptTooLong,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
