use crate::domain::errors::PromptError;

/// Shrinks a prompt that the model rejected as too long.
pub trait PromptSizeReductionStrategy: Send {
    fn is_reduction_possible(&self) -> bool;

    /// Drop some context and rebuild the prompt.
    fn reduce_size_and_generate_prompt(&mut self) -> Result<String, PromptError>;
}
