//! Renders parsed suites as Java source files.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::domain::models::{TestCaseGeneratedByLlm, TestSuiteGeneratedByLlm};
use crate::domain::ports::TestsPresenter;

const INDENT: &str = "    ";

/// `Generated` + the name with its first letter upper-cased.
pub fn test_case_class_name(test_case_name: &str) -> String {
    let mut chars = test_case_name.chars();
    let capitalized: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    format!("Generated{capitalized}")
}

/// Class names of every single-case file of `suite`, in case order.
///
/// A name already taken by an earlier case gets a `_<index>` suffix, so two
/// cases sharing a method name never share a file.
pub fn test_case_class_names(suite: &TestSuiteGeneratedByLlm) -> Vec<String> {
    let mut taken = HashSet::new();
    suite
        .test_cases
        .iter()
        .enumerate()
        .map(|(index, test_case)| {
            let base = test_case_class_name(&test_case.name);
            let mut candidate = base.clone();
            let mut suffix = index;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

fn indent_block(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{INDENT}{}", line.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Java/JUnit presenter; the suite class name comes from configuration.
#[derive(Debug, Clone)]
pub struct JavaTestsPresenter {
    test_suite_class_name: String,
}

impl JavaTestsPresenter {
    pub fn new(test_suite_class_name: impl Into<String>) -> Self {
        Self {
            test_suite_class_name: test_suite_class_name.into(),
        }
    }

    pub fn test_suite_class_name(&self) -> &str {
        &self.test_suite_class_name
    }

    /// File name the controller saves the whole suite under.
    pub fn test_suite_filename(&self) -> String {
        format!("{}.{}", self.test_suite_class_name, self.file_extension())
    }

    fn render(
        suite: &TestSuiteGeneratedByLlm,
        class_name: &str,
        test_cases: &[&TestCaseGeneratedByLlm],
    ) -> String {
        let mut source = String::new();

        if !suite.package_string.is_empty() {
            let _ = writeln!(source, "package {};\n", suite.package_string);
        }
        for import in &suite.imports {
            let _ = writeln!(source, "{import}");
        }
        if !suite.imports.is_empty() {
            source.push('\n');
        }
        if !suite.run_with.is_empty() {
            let _ = writeln!(source, "@RunWith({})", suite.run_with);
        }

        let _ = writeln!(source, "public class {class_name} {{");
        if !suite.other_info.trim().is_empty() {
            let _ = writeln!(source, "{}\n", indent_block(&suite.other_info));
        }
        let bodies: Vec<String> = test_cases
            .iter()
            .map(|test_case| indent_block(&test_case.code))
            .collect();
        if !bodies.is_empty() {
            let _ = writeln!(source, "{}", bodies.join("\n\n"));
        }
        source.push_str("}\n");

        source
    }
}

impl TestsPresenter for JavaTestsPresenter {
    fn represent_test_case(&self, suite: &TestSuiteGeneratedByLlm, index: usize) -> String {
        let test_case = suite.test_cases.get(index);
        let class_name = self.test_case_class_name(suite, index);
        Self::render(suite, &class_name, &test_case.into_iter().collect::<Vec<_>>())
    }

    fn represent_test_suite(&self, suite: &TestSuiteGeneratedByLlm) -> String {
        let test_cases: Vec<&TestCaseGeneratedByLlm> = suite.test_cases.iter().collect();
        Self::render(suite, &self.test_suite_class_name, &test_cases)
    }

    fn test_case_class_name(&self, suite: &TestSuiteGeneratedByLlm, index: usize) -> String {
        test_case_class_names(suite)
            .into_iter()
            .nth(index)
            .unwrap_or_else(|| self.test_suite_class_name.clone())
    }
}
