//! Model backends.

pub mod anthropic;
pub mod ollama;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use ollama::{OllamaBackend, OllamaConfig};
