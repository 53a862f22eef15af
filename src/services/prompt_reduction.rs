use crate::domain::errors::PromptError;
use crate::domain::ports::PromptSizeReductionStrategy;
use crate::services::prompt_generator::PromptGenerator;

/// Drops prompt context one level at a time.
///
/// Order: test sample, polymorphism relations, half of the interesting
/// classes (until none remain), superclass chain.
#[derive(Debug, Clone)]
pub struct ContextReductionStrategy {
    generator: PromptGenerator,
}

impl ContextReductionStrategy {
    pub fn new(generator: PromptGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &PromptGenerator {
        &self.generator
    }

    fn drop_next_level(&mut self) -> bool {
        let context = &mut self.generator.context_mut().class;

        if !context.test_sample.is_empty() {
            context.test_sample.clear();
        } else if !context.polymorphism_relations.is_empty() {
            context.polymorphism_relations.clear();
        } else if !context.interesting_classes.is_empty() {
            let keep = context.interesting_classes.len() / 2;
            context.interesting_classes.truncate(keep);
        } else if !context.superclasses.is_empty() {
            context.superclasses.clear();
        } else {
            return false;
        }
        true
    }
}

impl PromptSizeReductionStrategy for ContextReductionStrategy {
    fn is_reduction_possible(&self) -> bool {
        let context = &self.generator.context().class;
        !context.test_sample.is_empty()
            || !context.polymorphism_relations.is_empty()
            || !context.interesting_classes.is_empty()
            || !context.superclasses.is_empty()
    }

    fn reduce_size_and_generate_prompt(&mut self) -> Result<String, PromptError> {
        if self.drop_next_level() {
            tracing::info!("Prompt context reduced");
        }
        self.generator.generate_prompt()
    }
}
