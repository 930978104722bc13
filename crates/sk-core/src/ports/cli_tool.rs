//! Companion CLI tool port

use async_trait::async_trait;

/// Probing and staging of the companion CLI binary.
#[async_trait]
pub trait CliToolPort: Send + Sync {
    /// Whether the CLI is already installed. Side-effect-free.
    async fn is_installed(&self) -> anyhow::Result<bool>;

    /// Stage the bundled CLI binary so the privileged process can move it
    /// into place later. Idempotent: safe to invoke again after a partial
    /// earlier attempt.
    async fn stage_install(&self) -> anyhow::Result<()>;
}
