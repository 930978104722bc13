//! File-backed credentials probe
//!
//! Reads the credentials file the login flow persists and reports whether
//! it holds a usable token. A missing or empty file reads as signed-out;
//! an unparseable file surfaces as an error for the coordinator to map.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

use sk_core::ports::CredentialsPort;

pub const DEFAULT_CREDENTIALS_FILE: &str = "auth.json";

#[derive(Debug, Deserialize)]
struct StoredCredentials {
    #[serde(default)]
    token: String,
}

pub struct FileCredentialsProbe {
    credentials_path: PathBuf,
}

impl FileCredentialsProbe {
    /// Probe a specific credentials file.
    pub fn new(credentials_path: PathBuf) -> Self {
        Self { credentials_path }
    }

    /// Probe the default credentials file under the given base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            credentials_path: base_dir.join(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

#[async_trait]
impl CredentialsPort for FileCredentialsProbe {
    async fn is_authenticated(&self) -> anyhow::Result<bool> {
        if !self.credentials_path.exists() {
            return Ok(false);
        }

        let content = fs::read_to_string(&self.credentials_path).await?;
        if content.trim().is_empty() {
            return Ok(false);
        }

        let credentials: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse credentials file: {}", e))?;

        Ok(!credentials.token.is_empty())
    }
}
