//! Domain models for the test generation pipeline.

pub mod artifacts;
pub mod class_representation;
pub mod config;
pub mod execution;
pub mod feedback;
pub mod llm;
pub mod test_suite;

pub use artifacts::{
    CompilationResult, CompilationResultsContainer, FeedbackCycleIteration, IterationsContainer,
    RecordContainer, TestCasesCompilationSummary, TestSuiteCompilationResult,
};
pub use class_representation::{
    ClassRepresentation, ClassType, MethodRepresentation, PolymorphismRelation,
};
pub use config::{
    CompilerConfig, Config, GenerationConfig, LlmBackendKind, LlmConfig, LoggingConfig,
};
pub use execution::{ExecutionResult, TestCasesCompilationResult};
pub use feedback::{
    FeedbackCycleExecutionResult, FeedbackCycleTermination, FeedbackResponse, Report,
    ReportedTestCase, WarningType,
};
pub use llm::{ChatMessage, ChatRole, LlmResponse, ResponseErrorCode, SendResult};
pub use test_suite::{CompilableTestCases, TestCaseGeneratedByLlm, TestSuiteGeneratedByLlm};
