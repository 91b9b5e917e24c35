//! Lifecycle/Signal Supervisor: turns termination signals into an exit code
//! and cancels the dispatcher.

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Exit code for `quit`, end of input and SIGQUIT.
pub const QUIT_EXIT_CODE: u8 = 3;

/// Termination signals the program reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    Hangup,
    Interrupt,
    Terminate,
    Quit,
}

impl TermSignal {
    /// Process exit code reported for this signal.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Hangup => 1,
            Self::Interrupt => 2,
            Self::Terminate => 15,
            Self::Quit => QUIT_EXIT_CODE,
        }
    }
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hangup => "SIGHUP",
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
        })
    }
}

/// Wait for the next termination signal.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be installed.
#[cfg(unix)]
pub async fn next_signal() -> std::io::Result<TermSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    Ok(tokio::select! {
        _ = hangup.recv() => TermSignal::Hangup,
        _ = interrupt.recv() => TermSignal::Interrupt,
        _ = terminate.recv() => TermSignal::Terminate,
        _ = quit.recv() => TermSignal::Quit,
    })
}

/// Wait for the next termination signal.
///
/// # Errors
///
/// Returns an error if the Ctrl+C handler cannot be installed.
#[cfg(not(unix))]
pub async fn next_signal() -> std::io::Result<TermSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(TermSignal::Interrupt)
}

/// Wait for the first termination signal, cancel `cancel` and return the
/// exit code for that signal.
///
/// If handlers cannot be installed this logs a warning and never resolves,
/// leaving the dispatcher as the only way out.
pub async fn supervise(cancel: CancellationToken) -> u8 {
    match next_signal().await {
        Ok(signal) => {
            tracing::info!(%signal, code = signal.exit_code(), "termination signal received");
            cancel.cancel();
            signal.exit_code()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to install signal handlers");
            std::future::pending().await
        }
    }
}
