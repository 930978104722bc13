//! Staged installer for the companion CLI binary.
//!
//! The onboarding screen cannot write to privileged locations, so staging
//! copies the bundled binary into the app data directory; the privileged
//! process moves it into place once it receives the completion signal.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use sk_core::ports::CliToolPort;

pub const STAGED_BINARY_NAME: &str = "skiff-cli";

#[derive(Debug, thiserror::Error)]
pub enum CliInstallError {
    #[error("bundled cli binary missing at {path}")]
    BundleMissing { path: PathBuf },

    #[error("failed to stage cli binary: {0}")]
    Io(#[from] std::io::Error),
}

pub struct StagedCliInstaller {
    bundled_path: PathBuf,
    install_path: PathBuf,
    staging_dir: PathBuf,
}

impl StagedCliInstaller {
    /// `bundled_path` is the binary shipped inside the app bundle,
    /// `install_path` the final CLI location, `staging_dir` where staged
    /// copies wait for the privileged process.
    pub fn new(bundled_path: PathBuf, install_path: PathBuf, staging_dir: PathBuf) -> Self {
        Self {
            bundled_path,
            install_path,
            staging_dir,
        }
    }

    pub fn staged_path(&self) -> PathBuf {
        self.staging_dir.join(STAGED_BINARY_NAME)
    }

    async fn stage(&self) -> Result<(), CliInstallError> {
        if !self.bundled_path.exists() {
            return Err(CliInstallError::BundleMissing {
                path: self.bundled_path.clone(),
            });
        }

        fs::create_dir_all(&self.staging_dir).await?;
        // Overwrites whatever an earlier partial attempt left behind.
        fs::copy(&self.bundled_path, self.staged_path()).await?;
        Ok(())
    }
}

#[async_trait]
impl CliToolPort for StagedCliInstaller {
    async fn is_installed(&self) -> anyhow::Result<bool> {
        Ok(fs::try_exists(&self.install_path).await?)
    }

    async fn stage_install(&self) -> anyhow::Result<()> {
        self.stage().await.map_err(Into::into)
    }
}
