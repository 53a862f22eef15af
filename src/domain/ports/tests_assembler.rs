use crate::domain::models::TestSuiteGeneratedByLlm;

/// Sink that collects a streamed model response and parses it.
pub trait TestsAssembler: Send {
    /// Append a chunk of response text.
    fn consume(&mut self, text: &str);

    /// Everything consumed since the last `clear`.
    fn content(&self) -> &str;

    fn clear(&mut self);

    /// Parse the collected text; `None` when no suite can be recovered.
    fn assemble_test_suite(&self, package_name: &str) -> Option<TestSuiteGeneratedByLlm>;
}
