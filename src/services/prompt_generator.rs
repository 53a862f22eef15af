//! Builds the initial prompt from a template and the class context.

use serde::{Deserialize, Serialize};

use crate::domain::errors::PromptError;
use crate::domain::models::{ClassRepresentation, PolymorphismRelation};
use crate::services::prompt_builder::PromptBuilder;

/// Template used when no custom template is configured.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Generate unit tests in $LANGUAGE for $NAME to achieve 100% line coverage for this class.
Dont use @Before and @After test methods.
Make tests as atomic as possible.
All tests should be for $TESTING_PLATFORM.
In case of mocking, use $MOCKING_FRAMEWORK. But, do not use mocking for all tests.
Name all methods according to the template - [MethodUnderTest][Scenario]Test, and use only English letters.
The source code of class under test is as follows:
$CODE
$METHODS
$POLYMORPHISM
$TEST_SAMPLE
";

/// Everything known about the class under test.
///
/// This is the document accepted by `testsmith generate --class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassContext {
    pub class_under_test: ClassRepresentation,

    /// Superclass chain, nearest first.
    #[serde(default)]
    pub superclasses: Vec<ClassRepresentation>,

    /// Classes whose methods the class under test calls.
    #[serde(default)]
    pub interesting_classes: Vec<ClassRepresentation>,

    #[serde(default)]
    pub polymorphism_relations: Vec<PolymorphismRelation>,

    /// Existing tests shown to the model as a style sample.
    #[serde(default)]
    pub test_sample: String,
}

impl ClassContext {
    pub fn new(class_under_test: ClassRepresentation) -> Self {
        Self {
            class_under_test,
            superclasses: vec![],
            interesting_classes: vec![],
            polymorphism_relations: vec![],
            test_sample: String::new(),
        }
    }
}

/// Prompt inputs: target platform settings plus the class context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub language: String,
    pub testing_platform: String,
    pub mocking_framework: String,
    pub include_superclasses: bool,
    pub class: ClassContext,
}

impl PromptContext {
    /// `[cut, super, super-super, ...]`
    pub fn classes_to_test(&self) -> Vec<ClassRepresentation> {
        std::iter::once(self.class.class_under_test.clone())
            .chain(self.class.superclasses.iter().cloned())
            .collect()
    }
}

/// Generates prompts from one template; the context may be trimmed between calls.
#[derive(Debug, Clone)]
pub struct PromptGenerator {
    template: String,
    context: PromptContext,
}

impl PromptGenerator {
    pub fn new(template: impl Into<String>, context: PromptContext) -> Self {
        Self {
            template: template.into(),
            context,
        }
    }

    pub fn context(&self) -> &PromptContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PromptContext {
        &mut self.context
    }

    pub fn generate_prompt(&self) -> Result<String, PromptError> {
        let context = &self.context;
        let cut = &context.class.class_under_test;

        tracing::debug!(class = %cut.qualified_name, "Generating prompt");

        Ok(PromptBuilder::new(self.template.as_str())
            .insert_language(&context.language)?
            .insert_name(cut.simple_name())?
            .insert_testing_platform(&context.testing_platform)?
            .insert_mocking_framework(&context.mocking_framework)?
            .insert_code_under_test(cut, &context.classes_to_test(), context.include_superclasses)?
            .insert_methods_signatures(&context.class.interesting_classes)?
            .insert_polymorphism_relations(&context.class.polymorphism_relations)?
            .insert_test_sample(&context.class.test_sample)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ClassType, MethodRepresentation};

    fn context() -> PromptContext {
        let cut = ClassRepresentation::new("com.example.Calc", "class Calc { int add(int a, int b) { return a + b; } }");
        let mut class = ClassContext::new(cut);
        class.superclasses = vec![ClassRepresentation::new("com.example.Base", "class Base {}")];
        class.interesting_classes = vec![ClassRepresentation::new("com.example.Util", "class Util {}")
            .with_methods(vec![MethodRepresentation {
                signature: "int twice(int)".to_string(),
                containing_class_qualified_name: "com.example.Util".to_string(),
            }])];
        class.polymorphism_relations = vec![PolymorphismRelation {
            base: ClassRepresentation::new("com.example.Shape", ""),
            derived: vec![ClassRepresentation::new("com.example.Circle", "")
                .with_class_type(ClassType::Class)],
        }];

        PromptContext {
            language: "Java".to_string(),
            testing_platform: "JUnit 4".to_string(),
            mocking_framework: "Mockito 5".to_string(),
            include_superclasses: true,
            class,
        }
    }

    #[test]
    fn test_default_template_fills_every_token() {
        let prompt = PromptGenerator::new(DEFAULT_PROMPT_TEMPLATE, context())
            .generate_prompt()
            .unwrap();

        assert!(!prompt.contains('$'));
        assert!(prompt.contains("unit tests in Java for Calc"));
        assert!(prompt.contains("com.example.Calc extends com.example.Base."));
        assert!(prompt.contains(" - int twice(int)"));
        assert!(prompt.contains("com.example.Circle is a sub-class of com.example.Shape."));
    }

    #[test]
    fn test_missing_mandatory_keyword_is_error() {
        let err = PromptGenerator::new("Tests for $NAME with $CODE", context())
            .generate_prompt()
            .unwrap_err();
        assert_eq!(err, PromptError::MissingKeyword("LANGUAGE"));
    }

    #[test]
    fn test_class_context_from_json() {
        let json = r#"{
            "class_under_test": {"qualified_name": "a.B", "full_text": "class B {}"},
            "test_sample": "@Test void x() {}"
        }"#;
        let class: ClassContext = serde_json::from_str(json).unwrap();
        assert_eq!(class.class_under_test.simple_name(), "B");
        assert!(class.superclasses.is_empty());
        assert_eq!(class.test_sample, "@Test void x() {}");
    }
}
