//! Spinner utilities using indicatif for terminal output

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::ports::{CancellationFlag, ProgressIndicator};

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✓").green(), message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✗").red(), message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("!").yellow(), message.into()));
    }
}

/// Feedback-cycle progress shown on a spinner, canceled through a shared flag.
#[derive(Clone)]
pub struct SpinnerIndicator {
    spinner: ProgressBar,
    cancellation: CancellationFlag,
}

impl SpinnerIndicator {
    pub fn new(spinner: ProgressBar, cancellation: CancellationFlag) -> Self {
        Self {
            spinner,
            cancellation,
        }
    }

    /// Indicator that draws nothing, for JSON output.
    pub fn hidden(cancellation: CancellationFlag) -> Self {
        Self::new(ProgressBar::hidden(), cancellation)
    }

    pub fn spinner(&self) -> &ProgressBar {
        &self.spinner
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }
}

impl ProgressIndicator for SpinnerIndicator {
    fn is_canceled(&self) -> bool {
        self.cancellation.is_canceled()
    }

    fn set_text(&self, text: &str) {
        self.spinner.set_message(text.to_string());
    }
}
