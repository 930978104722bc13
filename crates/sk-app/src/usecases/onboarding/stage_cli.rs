//! Background staging of the companion CLI binary.
//!
//! Staging is a convenience, never a precondition for finishing
//! onboarding: every failure here is logged and swallowed, and nothing
//! downstream waits on the outcome.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use sk_core::ports::CliToolPort;
use sk_core::retry::RetryPolicy;

/// Use case that stages the companion CLI, retrying with backoff.
pub struct StageCliTool {
    cli_tool: Arc<dyn CliToolPort>,
    policy: RetryPolicy,
}

impl StageCliTool {
    pub fn new(cli_tool: Arc<dyn CliToolPort>, policy: RetryPolicy) -> Self {
        Self { cli_tool, policy }
    }

    /// Returns true once the CLI is staged, either because it was already
    /// installed or because a staging attempt succeeded.
    ///
    /// Backoff waits are abandoned when `shutdown` flips; an attempt that
    /// is already dispatched runs to completion, which is harmless since
    /// staging is idempotent.
    pub async fn execute(&self, mut shutdown: watch::Receiver<bool>) -> bool {
        match self.cli_tool.is_installed().await {
            Ok(true) => {
                debug!("cli already installed, skipping staging");
                return true;
            }
            Ok(false) => {}
            Err(err) => {
                // An unreachable probe reads as "not installed".
                warn!(error = %err, "cli install probe failed, attempting staging");
            }
        }

        for attempt in 0..self.policy.max_attempts {
            if *shutdown.borrow() {
                return false;
            }
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt - 1);
                tokio::select! {
                    _ = shutdown.changed() => {
                        debug!("shutdown during staging backoff, giving up");
                        return false;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            match self.cli_tool.stage_install().await {
                Ok(()) => {
                    info!(attempt, "cli binary staged");
                    return true;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "cli staging attempt failed");
                }
            }
        }

        warn!(
            attempts = self.policy.max_attempts,
            "cli staging retries exhausted"
        );
        false
    }
}
