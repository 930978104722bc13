//! Completion signal port
//!
//! One-directional notification toward the privileged process that the
//! sign-in step of onboarding finished. The channel itself has no
//! deduplication; the coordinator's state machine is what makes the
//! message one-shot.

use async_trait::async_trait;

#[async_trait]
pub trait CompletionSignalPort: Send + Sync {
    /// Notify the privileged process that sign-in completed, carrying the
    /// CLI install opt-in. Best-effort: no acknowledgment is expected and
    /// an absent receiver is not an error.
    async fn signal_installation_complete(&self, cli_opt_in: bool) -> anyhow::Result<()>;
}
