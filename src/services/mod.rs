//! Service layer: the feedback cycle and the pieces it is assembled from.

pub mod artifact_recorder;
pub mod feedback_cycle;
pub mod prompt_builder;
pub mod prompt_generator;
pub mod prompt_reduction;
pub mod request_manager;

pub use artifact_recorder::ArtifactRecorder;
pub use feedback_cycle::{FeedbackCycleCollaborators, FeedbackCycleSettings, LlmWithFeedbackCycle};
pub use prompt_builder::{PromptBuilder, PromptKeyword};
pub use prompt_generator::{ClassContext, PromptContext, PromptGenerator, DEFAULT_PROMPT_TEMPLATE};
pub use prompt_reduction::ContextReductionStrategy;
pub use request_manager::ChatRequestManager;
