//! Error message formatting with actionable suggestions.

use super::colors::ColorSupport;
use std::error::Error;
use sysdeps_core::SysdepsError;

/// Renders a [`SysdepsError`] with its help text and cause chain
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    pub fn format_error(&self, error: &SysdepsError) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);

        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&format!("{}: {}\n", self.colors.dim("caused by"), err));
            source = err.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("\n{}: {}\n", self.colors.dim("help"), suggestion));
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
