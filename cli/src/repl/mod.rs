//! Command Dispatcher: the prompt loop and the pending-command queue.
//!
//! One line from the operator yields one token, which is queued and drained.
//! Macro commands append their expansion to the tail of the queue, so the
//! whole expansion runs before the prompt is shown again.

mod handlers;
mod session;

pub use session::Session;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    Console, InstanceProvider, LineSource, NetworkManager, ProfileWriter, RemoteShell,
};
use crate::application::services::registry::InstanceRegistry;
use crate::domain::command::first_token;
use crate::domain::{Command, CommandQueue, Settings};

/// Farewell printed on `quit` and at end of input.
pub const FAREWELL: &str = "Bye! C ya l8er!";

/// Why the dispatcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The operator quit or input ended.
    Quit,
    /// The cancellation token fired.
    Cancelled,
}

/// What a handler asks the drain loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next queued token.
    Done,
    /// Append these tokens to the tail of the queue.
    Enqueue(&'static [&'static str]),
    /// The handler reported a failure; drop the rest of the queue.
    Abort,
    /// Stop the dispatcher.
    Quit,
}

/// Owns the registry, the selection and every port the commands use.
pub struct Dispatcher<P, S, N, W, I, C>
where
    P: InstanceProvider,
    S: RemoteShell,
    N: NetworkManager,
    W: ProfileWriter,
    I: LineSource,
    C: Console,
{
    registry: InstanceRegistry<P>,
    remote: S,
    network: N,
    writer: W,
    input: I,
    console: C,
    settings: Settings,
    session: Session,
    queue: CommandQueue,
}

impl<P, S, N, W, I, C> Dispatcher<P, S, N, W, I, C>
where
    P: InstanceProvider,
    S: RemoteShell,
    N: NetworkManager,
    W: ProfileWriter,
    I: LineSource,
    C: Console,
{
    pub fn new(
        registry: InstanceRegistry<P>,
        remote: S,
        network: N,
        writer: W,
        input: I,
        console: C,
        settings: Settings,
    ) -> Self {
        Self {
            registry,
            remote,
            network,
            writer,
            input,
            console,
            settings,
            session: Session::new(),
            queue: CommandQueue::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Startup: select the sole instance automatically (or prompt when there
    /// are several), then print the help table and the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if reading operator input fails.
    pub async fn welcome(&mut self) -> Result<()> {
        let chosen = self
            .registry
            .select_interactive(true, &mut self.input, &self.console)
            .await?
            .map(|instance| instance.id.clone());
        if let Some(id) = chosen {
            self.session.select(id);
        }

        self.help();
        if self.session.selected().is_some() {
            self.console.line("");
            self.print_selected();
        }
        Ok(())
    }

    /// Prompt, read, queue and drain until quit, end of input or
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading the prompt line fails.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<Exit> {
        loop {
            if cancel.is_cancelled() {
                return Ok(Exit::Cancelled);
            }
            self.console.inline("\n> ");

            let line = tokio::select! {
                () = cancel.cancelled() => return Ok(Exit::Cancelled),
                line = self.input.read_line() => line?,
            };
            let Some(line) = line else {
                tracing::debug!("end of input");
                self.console.line("");
                self.console.line(FAREWELL);
                return Ok(Exit::Quit);
            };
            let Some(token) = first_token(&line) else {
                continue;
            };

            self.queue.push(token);
            if let Some(exit) = self.drain(cancel).await {
                return Ok(exit);
            }
        }
    }

    /// Run queued tokens in FIFO order until the queue is empty.
    async fn drain(&mut self, cancel: &CancellationToken) -> Option<Exit> {
        while let Some(token) = self.queue.pop() {
            if cancel.is_cancelled() {
                return Some(Exit::Cancelled);
            }
            let Ok(command) = token.parse::<Command>() else {
                self.console.line("Invalid command");
                continue;
            };
            tracing::debug!(?command, pending = self.queue.len(), "dispatching");

            match self.dispatch(command).await {
                Ok(Flow::Done) => {}
                Ok(Flow::Enqueue(tokens)) => self.queue.extend(tokens.iter().copied()),
                Ok(Flow::Abort) => self.queue.clear(),
                Ok(Flow::Quit) => return Some(Exit::Quit),
                Err(e) => {
                    self.console.error(&format!("Error: {e:#}"));
                    self.queue.clear();
                }
            }
        }
        None
    }
}
