//! Table output formatting for CLI commands
//!
//! Renders reports and recorded artifacts with comfy-table.

use crate::cli::output::truncate;
use crate::domain::models::{
    CompilationResult, FeedbackCycleExecutionResult, FeedbackCycleIteration, Report,
};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Test cases of an accepted suite
    pub fn format_report(&self, report: &Report) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["#", "Test", "Lines"]));

        for (id, test_case) in &report.test_case_list {
            table.add_row(vec![
                Cell::new(id),
                Cell::new(&test_case.test_name),
                Cell::new(test_case.test_code.lines().count()),
            ]);
        }

        table.to_string()
    }

    /// Contents of `iterations.json`
    pub fn format_iterations(&self, iterations: &[FeedbackCycleIteration]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Iteration", "Prompt chars", "Response chars", "Prompt"]));

        for iteration in iterations {
            let first_line = iteration.prompt.lines().next().unwrap_or_default();
            table.add_row(vec![
                Cell::new(iteration.iteration),
                Cell::new(iteration.prompt_length),
                Cell::new(iteration.response_length),
                Cell::new(truncate(first_line, 60)),
            ]);
        }

        table.to_string()
    }

    /// Contents of `compilations.json`
    pub fn format_compilations(&self, compilations: &[CompilationResult]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Iteration", "Suite exit", "Compilable cases", "Message"]));

        for compilation in compilations {
            let exit_code = compilation.test_suite.exit_code;
            let exit_cell = if self.use_colors {
                Cell::new(exit_code).fg(if exit_code == 0 { Color::Green } else { Color::Red })
            } else {
                Cell::new(exit_code)
            };
            let first_line = compilation
                .test_suite
                .compilation_message
                .lines()
                .next()
                .unwrap_or("-");

            table.add_row(vec![
                Cell::new(compilation.iteration),
                exit_cell,
                Cell::new(format!(
                    "{}/{}",
                    compilation.test_cases.compilable, compilation.test_cases.total
                )),
                Cell::new(truncate(first_line, 60)),
            ]);
        }

        table.to_string()
    }

    /// Styled outcome label
    pub fn format_outcome(&self, result: FeedbackCycleExecutionResult) -> String {
        let label = result.to_string();
        if !self.use_colors {
            return format!("{} {label}", outcome_icon(result));
        }
        match result {
            FeedbackCycleExecutionResult::Ok => console::style(label).green().bold().to_string(),
            FeedbackCycleExecutionResult::Canceled => console::style(label).dim().to_string(),
            _ => console::style(label).red().bold().to_string(),
        }
    }

    /// Create a base table with common settings
    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn outcome_icon(result: FeedbackCycleExecutionResult) -> &'static str {
    match result {
        FeedbackCycleExecutionResult::Ok => "✓",
        FeedbackCycleExecutionResult::Canceled => "⊘",
        _ => "✗",
    }
}
