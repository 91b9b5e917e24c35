//! Filesystem infrastructure: the client profile directory.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ProfileWriter;

/// Writes client profiles into a fixed directory (the working directory in
/// production).
pub struct LocalProfileDir {
    dir: PathBuf,
}

impl LocalProfileDir {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ProfileWriter for LocalProfileDir {
    async fn write_profile(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.profile_path(file_name);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("writing profile {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
                .await
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(path)
    }

    fn profile_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}
