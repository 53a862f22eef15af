use crate::domain::models::TestSuiteGeneratedByLlm;

/// Renders parsed suites back into compilable source files.
pub trait TestsPresenter: Send + Sync {
    /// Source of a file holding only the case at `index`, plus scaffolding.
    fn represent_test_case(&self, suite: &TestSuiteGeneratedByLlm, index: usize) -> String;

    /// Source of the whole suite.
    fn represent_test_suite(&self, suite: &TestSuiteGeneratedByLlm) -> String;

    /// Class name of the single-case file for the case at `index`.
    ///
    /// Distinct for every index of `suite`, even when case names repeat.
    fn test_case_class_name(&self, suite: &TestSuiteGeneratedByLlm, index: usize) -> String;

    /// File extension of rendered sources, without the dot.
    fn file_extension(&self) -> &'static str {
        "java"
    }
}
