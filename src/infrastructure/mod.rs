//! Infrastructure layer module
//!
//! Adapters satisfying the domain ports:
//! - javac compilation verifier and the shell command runner
//! - JUnit response parsing and Java rendering
//! - Ollama and Anthropic model backends
//! - File storage for generated tests
//! - Configuration management and logging

pub mod compiler;
pub mod config;
pub mod junit;
pub mod llm;
pub mod logging;
pub mod process;
pub mod storage;

pub use storage::FileTestsStorage;
