//! Port trait definitions (Hexagonal Architecture)
//!
//! The feedback cycle only sees these contracts:
//! - RequestManager / LlmBackend: model transport
//! - TestsAssembler: response collection and parsing
//! - TestCompiler: compilation verifier
//! - TestsPersistentStorage / TestsPresenter: candidate file output
//! - PromptSizeReductionStrategy: prompt shrinking
//! - ProgressIndicator: progress text and cooperative cancellation

pub mod progress;
pub mod prompt_reduction;
pub mod request_manager;
pub mod test_compiler;
pub mod test_storage;
pub mod tests_assembler;
pub mod tests_presenter;

pub use progress::{CancellationFlag, NoProgress, ProgressIndicator};
pub use prompt_reduction::PromptSizeReductionStrategy;
pub use request_manager::{LlmBackend, RequestManager};
pub use test_compiler::TestCompiler;
pub use test_storage::TestsPersistentStorage;
pub use tests_assembler::TestsAssembler;
pub use tests_presenter::TestsPresenter;
