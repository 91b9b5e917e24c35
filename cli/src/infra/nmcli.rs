//! `NetworkManager` port backed by the `nmcli` binary.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, NetworkManager};

/// Drives NetworkManager connection profiles through `nmcli connection …`.
pub struct Nmcli<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> Nmcli<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    async fn connection(&self, args: &[&str]) -> Result<bool> {
        let mut full = vec!["connection"];
        full.extend_from_slice(args);
        let output = self
            .runner
            .run(&self.program, &full)
            .await
            .with_context(|| format!("{} connection {}", self.program, args.join(" ")))?;
        if !output.status.success() {
            tracing::debug!(
                args = ?full,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "nmcli reported failure"
            );
        }
        Ok(output.status.success())
    }
}

impl<R: CommandRunner> NetworkManager for Nmcli<R> {
    async fn delete(&self, name: &str) -> Result<bool> {
        self.connection(&["delete", name]).await
    }

    async fn import_openvpn(&self, path: &Path) -> Result<bool> {
        let path = path.to_string_lossy().into_owned();
        self.connection(&["import", "type", "openvpn", "file", path.as_str()])
            .await
    }

    async fn up(&self, name: &str) -> Result<bool> {
        self.connection(&["up", name]).await
    }

    async fn down(&self, name: &str) -> Result<bool> {
        self.connection(&["down", name]).await
    }
}
