//! Loading settings from the process environment and an optional dotenv file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::Settings;

/// Load `env_file` (or `.env` in the working directory) into the process
/// environment, then read [`Settings`] from it.
///
/// Variables already set in the environment win over the file. An explicit
/// `env_file` that cannot be read is an error; a missing default `.env` is not.
///
/// # Errors
///
/// Returns an error if the explicit file is unreadable or a required variable
/// is missing or empty.
pub fn load_settings(env_file: Option<&Path>) -> Result<Settings> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("cannot load env file {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded env file");
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("cannot load .env"),
        },
    }
    Settings::from_vars(std::env::vars())
}
