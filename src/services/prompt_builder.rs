//! Prompt template engine.
//!
//! Templates contain `$KEYWORD` tokens that are replaced literally, one
//! keyword at a time. Mandatory keywords must be present in the template;
//! optional ones are skipped silently when absent.

use std::fmt::Write as _;

use crate::domain::errors::PromptError;
use crate::domain::models::{ClassRepresentation, PolymorphismRelation};

/// Namespaces whose classes and methods never appear in the prompt.
const EXCLUDED_NAMESPACES: [&str; 2] = ["java.", "javax."];

const METHODS_INTRO: &str = "Here are some information about other methods and classes used by the class under test. Only use them for creating objects, not your own ideas.\n";

const TEST_SAMPLE_INTRO: &str = "Use this test samples:\n";

/// Placeholders understood by [`PromptBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKeyword {
    Name,
    Code,
    Language,
    TestingPlatform,
    MockingFramework,
    MethodDeclarations,
    Methods,
    Polymorphism,
    TestSample,
}

impl PromptKeyword {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Code,
        Self::Language,
        Self::TestingPlatform,
        Self::MockingFramework,
        Self::MethodDeclarations,
        Self::Methods,
        Self::Polymorphism,
        Self::TestSample,
    ];

    /// Keyword text without the leading `$`.
    pub const fn text(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Code => "CODE",
            Self::Language => "LANGUAGE",
            Self::TestingPlatform => "TESTING_PLATFORM",
            Self::MockingFramework => "MOCKING_FRAMEWORK",
            Self::MethodDeclarations => "METHOD_DECLARATIONS",
            Self::Methods => "METHODS",
            Self::Polymorphism => "POLYMORPHISM",
            Self::TestSample => "TEST_SAMPLE",
        }
    }

    pub const fn mandatory(self) -> bool {
        matches!(
            self,
            Self::Name | Self::Language | Self::TestingPlatform | Self::MockingFramework
        )
    }

    /// Token as written in templates.
    pub fn token(self) -> String {
        format!("${}", self.text())
    }
}

fn is_excluded(qualified_name: &str) -> bool {
    EXCLUDED_NAMESPACES
        .iter()
        .any(|prefix| qualified_name.starts_with(prefix))
}

/// Builds a prompt by filling keyword tokens of a template.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    prompt: String,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            prompt: template.into(),
        }
    }

    fn has_keyword(&self, keyword: PromptKeyword) -> bool {
        self.prompt.contains(&keyword.token())
    }

    fn check(&self, keyword: PromptKeyword) -> Result<(), PromptError> {
        if self.has_keyword(keyword) || !keyword.mandatory() {
            Ok(())
        } else {
            Err(PromptError::MissingKeyword(keyword.text()))
        }
    }

    fn replace(mut self, keyword: PromptKeyword, text: &str) -> Self {
        self.prompt = self.prompt.replace(&keyword.token(), text);
        self
    }

    fn insert_plain(self, keyword: PromptKeyword, text: &str) -> Result<Self, PromptError> {
        self.check(keyword)?;
        Ok(self.replace(keyword, text))
    }

    pub fn insert_language(self, language: &str) -> Result<Self, PromptError> {
        self.insert_plain(PromptKeyword::Language, language)
    }

    pub fn insert_name(self, class_display_name: &str) -> Result<Self, PromptError> {
        self.insert_plain(PromptKeyword::Name, class_display_name)
    }

    pub fn insert_testing_platform(self, testing_platform: &str) -> Result<Self, PromptError> {
        self.insert_plain(PromptKeyword::TestingPlatform, testing_platform)
    }

    pub fn insert_mocking_framework(self, mocking_framework: &str) -> Result<Self, PromptError> {
        self.insert_plain(PromptKeyword::MockingFramework, mocking_framework)
    }

    /// Insert the class under test, fenced.
    ///
    /// `classes_to_test` is the chain `[cut, super, super-super, ...]`. With
    /// `insert_superclasses`, every subclass/superclass pair adds a sentence
    /// naming the relation followed by the superclass source. `$CODE` takes
    /// the full class text; `$METHOD_DECLARATIONS` takes only declarations.
    pub fn insert_code_under_test(
        self,
        cut: &ClassRepresentation,
        classes_to_test: &[ClassRepresentation],
        insert_superclasses: bool,
    ) -> Result<Self, PromptError> {
        let (keyword, code) = if self.has_keyword(PromptKeyword::Code) {
            (PromptKeyword::Code, cut.full_text.as_str())
        } else if self.has_keyword(PromptKeyword::MethodDeclarations) {
            (
                PromptKeyword::MethodDeclarations,
                cut.methods_declaration.as_str(),
            )
        } else {
            return Err(PromptError::MissingCodeKeyword {
                code: PromptKeyword::Code.text(),
                declarations: PromptKeyword::MethodDeclarations.text(),
            });
        };

        let mut full_text = format!("```\n{code}\n```\n");

        if insert_superclasses {
            for pair in classes_to_test.windows(2) {
                let (sub_class, super_class) = (&pair[0], &pair[1]);
                let _ = write!(
                    full_text,
                    "{} extends {}. The source code of {} is:\n```\n{}\n```\n",
                    sub_class.qualified_name,
                    super_class.qualified_name,
                    super_class.qualified_name,
                    super_class.full_text,
                );
            }
        }

        Ok(self.replace(keyword, &full_text))
    }

    /// Insert method signatures of classes the class under test uses.
    pub fn insert_methods_signatures(
        self,
        interesting_classes: &[ClassRepresentation],
    ) -> Result<Self, PromptError> {
        self.check(PromptKeyword::Methods)?;

        let mut full_text = String::new();
        if !interesting_classes.is_empty() {
            full_text.push_str(METHODS_INTRO);
        }

        for class in interesting_classes {
            if is_excluded(&class.qualified_name) {
                continue;
            }

            let _ = writeln!(full_text, "=== methods in {}:", class.qualified_name);

            for method in &class.all_methods {
                if is_excluded(&method.containing_class_qualified_name) {
                    continue;
                }
                let _ = writeln!(full_text, " - {}", method.signature);
            }
        }

        Ok(self.replace(PromptKeyword::Methods, &full_text))
    }

    /// Insert one sentence per derived class naming its relation to the base.
    pub fn insert_polymorphism_relations(
        self,
        relations: &[PolymorphismRelation],
    ) -> Result<Self, PromptError> {
        tracing::debug!(count = relations.len(), "Inserting polymorphic relations");
        self.check(PromptKeyword::Polymorphism)?;

        let mut full_text = String::new();
        for relation in relations {
            for derived in &relation.derived {
                let _ = writeln!(
                    full_text,
                    "{} is {} {}.",
                    derived.qualified_name,
                    derived.class_type.subclass_relation(),
                    relation.base.qualified_name,
                );
            }
        }

        Ok(self.replace(PromptKeyword::Polymorphism, &full_text))
    }

    /// Insert sample tests; blank samples remove the token without a preamble.
    pub fn insert_test_sample(self, test_samples_code: &str) -> Result<Self, PromptError> {
        self.check(PromptKeyword::TestSample)?;

        let full_text = if test_samples_code.trim().is_empty() {
            String::new()
        } else {
            format!("{TEST_SAMPLE_INTRO}{test_samples_code}\n")
        };

        Ok(self.replace(PromptKeyword::TestSample, &full_text))
    }

    pub fn build(self) -> String {
        self.prompt
    }
}
