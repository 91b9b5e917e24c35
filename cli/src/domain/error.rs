//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::repl`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Startup configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {0} env variable")]
    Missing(&'static str),

    #[error("{var} is set but empty")]
    Empty { var: &'static str },

    #[error("unable to read private key {path}: {reason}")]
    PrivateKey { path: String, reason: String },

    #[error("invalid host key: {0}")]
    HostKey(String),
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Problems resolving the instance a command operates on.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("No instance selected. Use 'select' first.")]
    NotSelected,

    #[error("Instance {0} is not known to the registry.")]
    NotFound(String),

    #[error("Instance {0} disappeared from the inventory while waiting.")]
    Vanished(String),

    #[error("Instance {0} has no public address. Is it running?")]
    NoPublicAddress(String),
}

// ── Selection errors ──────────────────────────────────────────────────────────

/// Rejected answers to the interactive instance picker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid choice: {0:?} is not a number")]
    NotANumber(String),

    #[error("Invalid choice: out of range")]
    OutOfRange,
}

// ── Remote errors ─────────────────────────────────────────────────────────────

/// Failures of the remote command channel.
///
/// Only `Connect` is produced after retrying; the others are reported as-is.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("instance {0} has no public address")]
    NoAddress(String),

    #[error("cannot connect to {host} after {attempts} attempts: {reason}")]
    Connect {
        host: String,
        attempts: u32,
        reason: String,
    },

    #[error("remote session failed: {0}")]
    Session(String),

    #[error("remote command exited with status {status}: {stderr}")]
    Exit { status: u32, stderr: String },
}
