//! Domain layer for testsmith
//!
//! This module contains core models, errors and the port traits the
//! feedback cycle is written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    CompilerError, DomainError, DomainResult, FeedbackCycleError, LlmBackendError, PromptError,
    RecorderError,
};
