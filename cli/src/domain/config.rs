//! Runtime settings and their validation.
//!
//! Pure functions only. The caller hands in the environment as key/value
//! pairs (see `crate::infra::config` for the process-environment loader).

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Variables that must be present and non-empty.
pub const REQUIRED_VARS: &[&str] = &[
    "SSH_KEY_FILE",
    "SSH_HOST_KEY",
    "AWS_REGION",
    "OVPN_HOST",
    "NMCLI",
];

pub const DEFAULT_SSH_USER: &str = "ec2-user";
pub const DEFAULT_AWS_CLI: &str = "aws";
pub const DEFAULT_OVPN_IMAGE: &str = "kylemanna/openvpn";

// ── Settings schema ──────────────────────────────────────────────────────────

/// Everything the REPL needs from the environment.
///
/// Field names map to upper-case environment variables (`ssh_key_file` ⇐
/// `SSH_KEY_FILE`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Private key used for the remote shell.
    pub ssh_key_file: PathBuf,
    /// Expected host key of the instance, authorized-keys form.
    pub ssh_host_key: String,
    /// Region the instances live in.
    pub aws_region: String,
    /// OpenVPN data volume on the instance. Prompted for when absent.
    #[serde(default)]
    pub docker_volume: Option<String>,
    /// VPN server name baked into generated client profiles.
    pub ovpn_host: String,
    /// OpenVPN client name. Prompted for when absent.
    #[serde(default)]
    pub ovpn_user: Option<String>,
    /// Path to the `nmcli` executable.
    pub nmcli: PathBuf,
    /// Remote login name.
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,
    /// Provider CLI executable.
    #[serde(default = "default_aws_cli")]
    pub aws_cli: String,
    /// OpenVPN server image run on the instance.
    #[serde(default = "default_ovpn_image")]
    pub ovpn_image: String,
}

fn default_ssh_user() -> String {
    DEFAULT_SSH_USER.to_string()
}

fn default_aws_cli() -> String {
    DEFAULT_AWS_CLI.to_string()
}

fn default_ovpn_image() -> String {
    DEFAULT_OVPN_IMAGE.to_string()
}

impl Settings {
    /// Builds settings from environment-style key/value pairs.
    ///
    /// Empty optional values count as absent, so the REPL prompts for them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] or [`ConfigError::Empty`] for the
    /// first required variable that is unusable, or a deserialization error.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        check_required(&vars)?;
        let mut settings: Settings =
            envy::from_iter(vars).context("cannot parse configuration from environment")?;
        settings.docker_volume = settings.docker_volume.filter(|v| !v.trim().is_empty());
        settings.ovpn_user = settings.ovpn_user.filter(|v| !v.trim().is_empty());
        Ok(settings)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Ensures every variable in [`REQUIRED_VARS`] is set and non-empty.
///
/// # Errors
///
/// Returns the first missing or empty variable.
pub fn check_required(vars: &HashMap<String, String>) -> Result<(), ConfigError> {
    for &var in REQUIRED_VARS {
        match vars.get(var) {
            None => return Err(ConfigError::Missing(var)),
            Some(value) if value.trim().is_empty() => return Err(ConfigError::Empty { var }),
            Some(_) => {}
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
