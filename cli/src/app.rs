//! Application context: everything resolved before the REPL starts, and the
//! top-level race between the dispatcher and the signal supervisor.
//!
//! Configuration, credential material and the working directory are fatal
//! when missing, so they are all resolved in `AppContext::new`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::services::registry::InstanceRegistry;
use crate::domain::Settings;
use crate::infra::aws::AwsCliProvider;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, DEFAULT_NM_TIMEOUT, TokioCommandRunner};
use crate::infra::config::load_settings;
use crate::infra::fs::LocalProfileDir;
use crate::infra::nmcli::Nmcli;
use crate::infra::ssh::{SshChannel, SshSettings};
use crate::infra::terminal::StdinLines;
use crate::output::OutputContext;
use crate::repl::{Dispatcher, Exit};
use crate::supervisor::{self, QUIT_EXIT_CODE};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Dotenv file to load instead of `./.env`.
    pub env_file: Option<PathBuf>,
    /// Disable ANSI color output.
    pub no_color: bool,
}

/// The dispatcher wired to real infrastructure.
pub type LiveDispatcher = Dispatcher<
    AwsCliProvider<TokioCommandRunner>,
    SshChannel,
    Nmcli<TokioCommandRunner>,
    LocalProfileDir,
    StdinLines,
    OutputContext,
>;

/// Unified application context, constructed once in `Cli::run()`.
pub struct AppContext {
    /// Terminal output context (colors).
    pub output: OutputContext,
    /// Validated configuration.
    pub settings: Settings,
    ssh: SshSettings,
    /// Directory client profiles are written to and imported from.
    cwd: PathBuf,
}

impl AppContext {
    /// Resolve configuration, key material and the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or empty, either
    /// key cannot be loaded, or the working directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let settings = load_settings(flags.env_file.as_deref())?;
        let ssh = SshSettings::load(
            &settings.ssh_key_file,
            &settings.ssh_host_key,
            &settings.ssh_user,
        )?;
        let cwd = std::env::current_dir().context("failed to get working dir")?;
        tracing::debug!(region = %settings.aws_region, cwd = %cwd.display(), "context ready");

        Ok(Self {
            output: OutputContext::new(flags.no_color),
            settings,
            ssh,
            cwd,
        })
    }

    /// Build the live dispatcher. Performs the initial instance fetch.
    pub async fn into_dispatcher(self) -> LiveDispatcher {
        let Self {
            output,
            settings,
            ssh,
            cwd,
        } = self;

        let provider = AwsCliProvider::new(
            TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT),
            settings.aws_cli.clone(),
            settings.aws_region.clone(),
        );
        let registry = InstanceRegistry::connect(provider).await;
        let network = Nmcli::new(
            TokioCommandRunner::new(DEFAULT_NM_TIMEOUT),
            settings.nmcli.to_string_lossy().into_owned(),
        );

        Dispatcher::new(
            registry,
            SshChannel::new(ssh),
            network,
            LocalProfileDir::new(cwd),
            StdinLines::new(),
            output,
            settings,
        )
    }
}

enum Finished {
    Dispatcher(Exit),
    Signal(u8),
}

/// Run the REPL until quit, end of input or a termination signal, and return
/// the process exit code.
///
/// # Errors
///
/// Returns an error if reading operator input fails or the supervisor task
/// dies.
pub async fn run(ctx: AppContext) -> Result<u8> {
    let cancel = CancellationToken::new();
    let mut supervisor = tokio::spawn(supervisor::supervise(cancel.clone()));

    let session = async {
        let mut dispatcher = ctx.into_dispatcher().await;
        dispatcher.welcome().await?;
        dispatcher.run(&cancel).await
    };

    let finished = tokio::select! {
        exit = session => Finished::Dispatcher(exit?),
        code = &mut supervisor => Finished::Signal(code.context("signal supervisor failed")?),
    };

    let code = match finished {
        Finished::Dispatcher(Exit::Quit) => QUIT_EXIT_CODE,
        Finished::Dispatcher(Exit::Cancelled) => {
            (&mut supervisor).await.context("signal supervisor failed")?
        }
        Finished::Signal(code) => code,
    };

    cancel.cancel();
    supervisor.abort();
    tracing::debug!(code, "exiting");
    Ok(code)
}
