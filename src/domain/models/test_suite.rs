//! Test cases and suites parsed from model responses.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single generated test method.
///
/// Two cases are the same case when both name and source text match, which
/// is what deduplicates re-discovered cases across iterations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCaseGeneratedByLlm {
    pub name: String,
    /// Full method source including its annotations.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_exception: Option<String>,
}

impl TestCaseGeneratedByLlm {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            expected_exception: None,
        }
    }
}

impl fmt::Display for TestCaseGeneratedByLlm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Test cases plus the scaffolding they share in one response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestSuiteGeneratedByLlm {
    /// Package the generated files are declared in (may be empty).
    pub package_string: String,
    pub imports: Vec<String>,
    /// Body of a `@RunWith(...)` annotation, empty when absent.
    pub run_with: String,
    /// Fields, setup methods and helpers shared by all test cases.
    pub other_info: String,
    pub test_cases: Vec<TestCaseGeneratedByLlm>,
}

impl TestSuiteGeneratedByLlm {
    /// Replace the test cases, keeping the shared scaffolding.
    pub fn update_test_cases(&mut self, test_cases: Vec<TestCaseGeneratedByLlm>) {
        self.test_cases = test_cases;
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

impl fmt::Display for TestSuiteGeneratedByLlm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.test_cases.iter().map(|t| t.name.as_str()).collect();
        write!(
            f,
            "TestSuite(package='{}', tests=[{}])",
            self.package_string,
            names.join(", ")
        )
    }
}

/// Insertion-ordered set of every case ever proven to compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilableTestCases {
    order: Vec<TestCaseGeneratedByLlm>,
    seen: HashSet<TestCaseGeneratedByLlm>,
}

impl CompilableTestCases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a case; returns false when it was already present.
    pub fn insert(&mut self, test_case: TestCaseGeneratedByLlm) -> bool {
        if self.seen.contains(&test_case) {
            return false;
        }
        self.seen.insert(test_case.clone());
        self.order.push(test_case);
        true
    }

    pub fn extend<I: IntoIterator<Item = TestCaseGeneratedByLlm>>(&mut self, cases: I) {
        for case in cases {
            self.insert(case);
        }
    }

    pub fn contains(&self, test_case: &TestCaseGeneratedByLlm) -> bool {
        self.seen.contains(test_case)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCaseGeneratedByLlm> {
        self.order.iter()
    }

    pub fn to_vec(&self) -> Vec<TestCaseGeneratedByLlm> {
        self.order.clone()
    }
}

impl FromIterator<TestCaseGeneratedByLlm> for CompilableTestCases {
    fn from_iter<I: IntoIterator<Item = TestCaseGeneratedByLlm>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for CompilableTestCases {
    type Item = TestCaseGeneratedByLlm;
    type IntoIter = std::vec::IntoIter<TestCaseGeneratedByLlm>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}
