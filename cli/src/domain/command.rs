//! REPL command tokens, their aliases, and the pending-command queue.

use std::collections::VecDeque;
use std::str::FromStr;

/// A command understood by the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Select,
    List,
    Update,
    Info,
    Start,
    Stop,
    Run,
    File,
    Ssh,
    Set,
    Up,
    Down,
    Vpn,
    Quit,
}

/// Expansion of the `vpn` macro, in execution order.
pub const VPN_SEQUENCE: &[&str] = &["start", "run", "file", "set", "up"];

/// Help table. `{SI}` is replaced with the selected instance label.
pub const HELP_LINES: &[(&str, &str)] = &[
    ("help", "this list"),
    ("select", "select instance"),
    ("ls", "list instances"),
    ("upd", "refresh instances list"),
    ("info", "get info on {SI}"),
    ("start", "start {SI}"),
    ("stop", "stop {SI}"),
    ("run", "start ovpn daemon on {SI}"),
    ("file", "get ovpn file from {SI}"),
    ("ssh", "run ssh command on {SI}"),
    ("set", "install and connect to ovpn server on {SI}"),
    ("up", "connect to vpn"),
    ("down", "disconnect from vpn"),
    ("vpn", "start + run + file + set + up"),
    ("exit", "quit program"),
];

/// Placeholder for the selected instance inside [`HELP_LINES`].
pub const SELECTED_PLACEHOLDER: &str = "{SI}";

/// Returned by [`Command::from_str`] for tokens that are not commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "help" | "h" => Self::Help,
            "select" | "s" => Self::Select,
            "ls" | "list" => Self::List,
            "upd" | "u" => Self::Update,
            "info" | "i" => Self::Info,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "run" => Self::Run,
            "file" => Self::File,
            "ssh" => Self::Ssh,
            "set" => Self::Set,
            "up" => Self::Up,
            "down" => Self::Down,
            "vpn" => Self::Vpn,
            "exit" | "quit" | "x" | "q" => Self::Quit,
            other => return Err(UnknownCommand(other.to_string())),
        })
    }
}

impl Command {
    /// Whether the command needs a selected instance before it can run.
    #[must_use]
    pub fn requires_selection(self) -> bool {
        matches!(
            self,
            Self::Info | Self::Start | Self::Stop | Self::Run | Self::File | Self::Ssh
        )
    }

    /// Tokens a macro command expands into; empty for primitive commands.
    #[must_use]
    pub fn expansion(self) -> &'static [&'static str] {
        match self {
            Self::Vpn => VPN_SEQUENCE,
            _ => &[],
        }
    }
}

/// Extracts the command token from a raw input line (first word).
#[must_use]
pub fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// FIFO of pending command tokens.
///
/// Macro expansions are appended to the tail, so they run after everything
/// already queued.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<String>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.pending.push_back(token.into());
    }

    pub fn extend<I, T>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.pending.extend(tokens.into_iter().map(Into::into));
    }

    pub fn pop(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Drops everything still pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
