//! Remote Command Channel over SSH with host key pinning.
//!
//! Every `execute` call opens its own connection and session and tears both
//! down before returning. Only establishing the connection is retried.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use russh::client;
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PrivateKeyWithHashAlg;
use russh_keys::{PrivateKey, PublicKey, PublicKeyBase64};

use crate::application::ports::RemoteShell;
use crate::domain::{ConfigError, Instance, RemoteError};

/// Remote shell port.
pub const SSH_PORT: u16 = 22;

/// Connection attempts before giving up.
pub const CONNECT_ATTEMPTS: u32 = 3;

/// Fixed delay between connection attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Upper bound for one attempt (TCP connect, handshake, authentication).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

// ── Settings ──────────────────────────────────────────────────────────────────

/// Parsed trust material for the remote shell.
pub struct SshSettings {
    user: String,
    key: Arc<PrivateKey>,
    /// Canonical base64 encoding of the only host key we accept.
    host_key: String,
}

impl SshSettings {
    /// Parse the expected host key and load the private key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HostKey`] or [`ConfigError::PrivateKey`]. Both
    /// are fatal: there is no mode that connects without them.
    pub fn load(key_path: &Path, host_key: &str, user: &str) -> Result<Self, ConfigError> {
        let host_key = parse_host_key(host_key)?;
        let key = russh_keys::load_secret_key(key_path, None).map_err(|e| {
            ConfigError::PrivateKey {
                path: key_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            user: user.to_string(),
            key: Arc::new(key),
            host_key,
        })
    }
}

/// Extract and validate the key material from an authorized-keys
/// (`ssh-ed25519 AAAA… comment`) or known-hosts (`host ssh-ed25519 AAAA…`)
/// line. Returns the canonical base64 encoding.
///
/// # Errors
///
/// Returns [`ConfigError::HostKey`] when no token decodes as a public key.
pub fn parse_host_key(line: &str) -> Result<String, ConfigError> {
    line.split_whitespace()
        .find_map(|token| russh_keys::parse_public_key_base64(token).ok())
        .map(|key| key.public_key_base64())
        .ok_or_else(|| {
            ConfigError::HostKey(format!("no public key material found in {line:?}"))
        })
}

// ── Host key pinning ──────────────────────────────────────────────────────────

/// Client handler that accepts exactly one server key.
struct PinnedHostKey {
    expected: String,
}

#[async_trait::async_trait]
impl client::Handler for PinnedHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let matches = server_public_key.public_key_base64() == self.expected;
        if !matches {
            tracing::warn!("server host key does not match SSH_HOST_KEY; refusing connection");
        }
        Ok(matches)
    }
}

// ── Retry ─────────────────────────────────────────────────────────────────────

/// Call `connect` until it succeeds, at most `attempts` times, sleeping
/// `delay` between attempts (not after the last one).
///
/// `connect` receives the 1-based attempt number.
///
/// # Errors
///
/// Returns the last error together with the number of attempts made.
pub async fn retry_connect<T, E, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut connect: F,
) -> Result<T, (E, u32)>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match connect(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err((e, attempt)),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "connection attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

/// Production `RemoteShell`.
pub struct SshChannel {
    settings: SshSettings,
}

impl SshChannel {
    #[must_use]
    pub fn new(settings: SshSettings) -> Self {
        Self { settings }
    }

    async fn connect_once(&self, host: &str) -> anyhow::Result<client::Handle<PinnedHostKey>> {
        let config = Arc::new(client::Config::default());
        let handler = PinnedHostKey {
            expected: self.settings.host_key.clone(),
        };

        let mut handle = tokio::time::timeout(
            CONNECT_TIMEOUT,
            client::connect(config, (host, SSH_PORT), handler),
        )
        .await
        .with_context(|| format!("timed out after {}s", CONNECT_TIMEOUT.as_secs()))?
        .with_context(|| format!("connecting to {host}:{SSH_PORT}"))?;

        let key = PrivateKeyWithHashAlg::new(Arc::clone(&self.settings.key), None)
            .context("preparing private key")?;
        let accepted = handle
            .authenticate_publickey(self.settings.user.as_str(), key)
            .await
            .context("authenticating")?;
        anyhow::ensure!(
            accepted,
            "public key authentication rejected for user {}",
            self.settings.user
        );
        Ok(handle)
    }
}

impl RemoteShell for SshChannel {
    async fn execute(&self, instance: &Instance, command: &str) -> Result<String, RemoteError> {
        let host = instance
            .ssh_host()
            .ok_or_else(|| RemoteError::NoAddress(instance.id.clone()))?;

        let handle = retry_connect(CONNECT_ATTEMPTS, RETRY_DELAY, move |attempt| {
            tracing::debug!(host, attempt, "connecting");
            self.connect_once(host)
        })
        .await
        .map_err(|(e, attempts)| RemoteError::Connect {
            host: host.to_string(),
            attempts,
            reason: format!("{e:#}"),
        })?;

        let result = run_command(&handle, command).await;

        if let Err(e) = handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            tracing::debug!(error = %e, "disconnect failed");
        }
        result
    }
}

/// Run `command` in a fresh session channel and collect its stdout.
async fn run_command(
    handle: &client::Handle<PinnedHostKey>,
    command: &str,
) -> Result<String, RemoteError> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| RemoteError::Session(e.to_string()))?;
    channel
        .exec(true, command)
        .await
        .map_err(|e| RemoteError::Session(e.to_string()))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_status = None;
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            ChannelMsg::ExtendedData { ref data, ext: 1 } => stderr.extend_from_slice(data),
            ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
            _ => {}
        }
    }

    match exit_status {
        Some(0) => Ok(String::from_utf8_lossy(&stdout).into_owned()),
        Some(status) => Err(RemoteError::Exit {
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        }),
        None => Err(RemoteError::Session(
            "channel closed without an exit status".to_string(),
        )),
    }
}
