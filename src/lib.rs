//! Testsmith - LLM-driven unit test generation
//!
//! Testsmith asks a language model for unit tests of one class, compiles
//! what comes back, and feeds compiler errors into follow-up prompts until
//! the tests compile or the iteration budget is spent.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Feedback cycle, prompt templates, artifact recording
//! - **Infrastructure Layer** (`infrastructure`): javac, model backends, JUnit parsing, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use testsmith::services::{LlmWithFeedbackCycle, FeedbackCycleSettings};
//!
//! let mut cycle = LlmWithFeedbackCycle::new(prompt, settings, collaborators)?;
//! let response = cycle.run().await?;
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, FeedbackCycleExecutionResult, FeedbackResponse, LoggingConfig, Report,
    TestSuiteGeneratedByLlm, WarningType,
};
pub use domain::ports::{
    LlmBackend, ProgressIndicator, RequestManager, TestCompiler, TestsPersistentStorage,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ArtifactRecorder, LlmWithFeedbackCycle, PromptBuilder, PromptGenerator};
