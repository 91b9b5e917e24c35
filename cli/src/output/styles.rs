//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for console output.
#[derive(Default, Clone)]
pub struct Styles {
    /// Instance labels and the selected-instance marker (bold cyan)
    pub accent: Style,
    /// Error messages (red)
    pub error: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.accent = Style::new().bold().cyan();
        self.error = Style::new().red();
    }
}
