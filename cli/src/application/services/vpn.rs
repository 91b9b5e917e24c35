//! OpenVPN gateway use-cases: server launch, client profile, local profile.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Console, NetworkManager, ProfileWriter, RemoteShell};
use crate::domain::vpn::{client_profile_command, rewrite_server_address, server_command};
use crate::domain::{Instance, InstanceError};

/// Names shared by every VPN step.
#[derive(Debug, Clone, Copy)]
pub struct VpnTarget<'a> {
    /// Server name baked into profiles; also the local connection name.
    pub host: &'a str,
    /// OpenVPN server image on the instance.
    pub image: &'a str,
}

impl VpnTarget<'_> {
    /// `<host>.ovpn`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.ovpn", self.host)
    }
}

/// Launch the OpenVPN server container on `instance`.
///
/// Returns the remote output (the container id).
///
/// # Errors
///
/// Returns the remote channel error if the command cannot be run.
pub async fn launch_server(
    remote: &impl RemoteShell,
    instance: &Instance,
    target: VpnTarget<'_>,
    volume: &str,
) -> Result<String> {
    let output = remote
        .execute(instance, &server_command(target.image, volume))
        .await?;
    tracing::info!(instance_id = %instance.id, "openvpn server launched");
    Ok(output)
}

/// Generate the client profile for `user`, point it at the instance's public
/// IP and write it locally.
///
/// # Errors
///
/// Returns [`InstanceError::NoPublicAddress`] if the instance has no public
/// IP, the remote channel error, or the write error.
pub async fn fetch_client_profile(
    remote: &impl RemoteShell,
    writer: &impl ProfileWriter,
    instance: &Instance,
    target: VpnTarget<'_>,
    volume: &str,
    user: &str,
) -> Result<PathBuf> {
    let public_ip = instance
        .public_ip
        .as_deref()
        .ok_or_else(|| InstanceError::NoPublicAddress(instance.id.clone()))?;

    let profile = remote
        .execute(instance, &client_profile_command(target.image, volume, user))
        .await?;
    let profile = rewrite_server_address(&profile, target.host, public_ip);

    let path = writer
        .write_profile(&target.file_name(), &profile)
        .await
        .context("writing client profile")?;
    tracing::info!(path = %path.display(), "client profile written");
    Ok(path)
}

/// Replace the local connection profile with the one at `path`.
///
/// The delete step's outcome is ignored: there may be no previous profile.
/// Returns whether the import succeeded.
///
/// # Errors
///
/// Returns an error if the network manager cannot be run for the import.
pub async fn install_profile(
    network: &impl NetworkManager,
    console: &impl Console,
    target: VpnTarget<'_>,
    path: &Path,
) -> Result<bool> {
    console.inline(&format!("Deleting previous {} config...", target.host));
    match network.delete(target.host).await {
        Ok(removed) => tracing::debug!(removed, "previous profile delete finished"),
        Err(e) => tracing::debug!(error = %format!("{e:#}"), "previous profile delete failed"),
    }
    console.line("Done.");

    console.inline(&format!("Setting up new config for {}...", target.host));
    report(console, network.import_openvpn(path).await)
}

/// Bring the local connection up. Returns whether it succeeded.
///
/// # Errors
///
/// Returns an error if the network manager cannot be run at all.
pub async fn connect(
    network: &impl NetworkManager,
    console: &impl Console,
    target: VpnTarget<'_>,
) -> Result<bool> {
    console.inline(&format!("Connecting to {}...", target.host));
    report(console, network.up(target.host).await)
}

/// Bring the local connection down. Returns whether it succeeded.
///
/// # Errors
///
/// Returns an error if the network manager cannot be run at all.
pub async fn disconnect(
    network: &impl NetworkManager,
    console: &impl Console,
    target: VpnTarget<'_>,
) -> Result<bool> {
    console.inline(&format!("Stopping {}...", target.host));
    report(console, network.down(target.host).await)
}

/// Finish a progress line with `Done.` or `Failed.` and pass the result on.
fn report(console: &impl Console, result: Result<bool>) -> Result<bool> {
    let ok = matches!(result, Ok(true));
    console.line(if ok { "Done." } else { "Failed." });
    result
}
