//! Operator input from stdin.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::ports::LineSource;

/// The single line reader over stdin. The REPL and every sub-prompt pull from
/// this one buffer so no typed-ahead input is lost between them.
pub struct StdinLines {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinLines {
    async fn read_line(&mut self) -> Result<Option<String>> {
        let line = self.lines.next_line().await.context("reading stdin")?;
        Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
    }
}
