//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::repl`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Instance, RemoteError};

// ── Provider Port ─────────────────────────────────────────────────────────────

/// Cloud inventory and control API.
#[allow(async_fn_in_trait)]
pub trait InstanceProvider {
    /// Fetch every instance visible in the configured region.
    async fn describe(&self) -> Result<Vec<Instance>>;
    /// Request a start. Returns once the API accepted the request.
    async fn start(&self, id: &str) -> Result<()>;
    /// Request a stop. Returns once the API accepted the request.
    async fn stop(&self, id: &str) -> Result<()>;
}

// ── Remote Shell Port ─────────────────────────────────────────────────────────

/// One-shot remote command execution on an instance.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` on `instance` and return its standard output.
    ///
    /// Each call owns its own connection; nothing is reused across calls.
    async fn execute(&self, instance: &Instance, command: &str) -> Result<String, RemoteError>;
}

// ── Network Manager Port ──────────────────────────────────────────────────────

/// Local VPN connection-profile management. Each method reports whether the
/// underlying tool succeeded; `Err` means it could not be run at all.
#[allow(async_fn_in_trait)]
pub trait NetworkManager {
    /// Delete the connection profile `name`.
    async fn delete(&self, name: &str) -> Result<bool>;
    /// Import an OpenVPN client profile file as a new connection.
    async fn import_openvpn(&self, path: &Path) -> Result<bool>;
    /// Activate the connection profile `name`.
    async fn up(&self, name: &str) -> Result<bool>;
    /// Deactivate the connection profile `name`.
    async fn down(&self, name: &str) -> Result<bool>;
}

// ── Profile Writer Port ───────────────────────────────────────────────────────

/// Writes the generated client profile to local storage.
#[allow(async_fn_in_trait)]
pub trait ProfileWriter {
    /// Write `contents` as `file_name` and return the full path written.
    async fn write_profile(&self, file_name: &str, contents: &str) -> Result<PathBuf>;
    /// Full path a profile called `file_name` is (or would be) stored at.
    fn profile_path(&self, file_name: &str) -> PathBuf;
}

// ── Operator I/O Ports ────────────────────────────────────────────────────────

/// Line-oriented operator input shared by the REPL and every prompt.
#[allow(async_fn_in_trait)]
pub trait LineSource {
    /// Read one line without its terminator. `None` means end of input.
    async fn read_line(&mut self) -> Result<Option<String>>;
}

/// Operator-facing output so services never print directly. Sync trait.
pub trait Console {
    /// Print `message` followed by a newline.
    fn line(&self, message: &str);
    /// Print `message` without a newline (prompts, progress markers).
    fn inline(&self, message: &str);
    /// Print an error message.
    fn error(&self, message: &str);
    /// Emphasise `text` (instance labels); plain consoles return it as-is.
    fn accent(&self, text: &str) -> String;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}
