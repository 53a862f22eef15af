use crate::domain::models::TestSuiteGeneratedByLlm;
use crate::domain::ports::TestsAssembler;
use crate::infrastructure::junit::parser::JUnitTestSuiteParser;

/// Collects streamed response text and parses it as a JUnit suite.
#[derive(Debug, Clone, Default)]
pub struct JUnitTestsAssembler {
    content: String,
    parser: JUnitTestSuiteParser,
}

impl JUnitTestsAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TestsAssembler for JUnitTestsAssembler {
    fn consume(&mut self, text: &str) {
        self.content.push_str(text);
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn clear(&mut self) {
        self.content.clear();
    }

    fn assemble_test_suite(&self, package_name: &str) -> Option<TestSuiteGeneratedByLlm> {
        self.parser.parse_test_suite(&self.content, package_name)
    }
}
