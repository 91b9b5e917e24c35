//! Output formatting module

pub mod styles;

use std::io::Write as _;

use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

use crate::application::ports::Console;

/// Output context carrying the active stylesheet.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool) -> Self {
        let use_colors =
            !no_color && Term::stdout().is_term() && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self { styles }
    }
}

impl Console for OutputContext {
    fn line(&self, message: &str) {
        println!("{message}");
    }

    /// Prompts and progress markers must appear before the next read or
    /// sleep, so stdout is flushed here.
    fn inline(&self, message: &str) {
        print!("{message}");
        let _ = std::io::stdout().flush();
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message.style(self.styles.error));
    }

    fn accent(&self, text: &str) -> String {
        text.style(self.styles.accent).to_string()
    }
}
