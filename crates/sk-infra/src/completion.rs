//! Channel-backed completion signal.
//!
//! Carries the installation-completion message toward the privileged
//! process. The channel does not deduplicate; the coordinator's state
//! machine is what makes the message one-shot.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use sk_core::ports::CompletionSignalPort;

/// Message sent when onboarding's sign-in step finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallationComplete {
    /// Whether the user opted into installing the companion CLI.
    pub cli_opt_in: bool,
}

pub struct ChannelCompletionSignal {
    tx: mpsc::Sender<InstallationComplete>,
}

impl ChannelCompletionSignal {
    pub fn new(tx: mpsc::Sender<InstallationComplete>) -> Self {
        Self { tx }
    }

    /// Create a signal together with the receiving end consumed by the
    /// privileged process side.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<InstallationComplete>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl CompletionSignalPort for ChannelCompletionSignal {
    async fn signal_installation_complete(&self, cli_opt_in: bool) -> anyhow::Result<()> {
        // Receiver may be absent; the message then lands in the void.
        if self
            .tx
            .send(InstallationComplete { cli_opt_in })
            .await
            .is_err()
        {
            debug!("completion signal dropped, receiver is gone");
        }
        Ok(())
    }
}
