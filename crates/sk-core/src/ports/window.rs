//! Window lifecycle port

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Visibility events for the window hosting the onboarding screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowVisibility {
    Hidden,
    Shown,
}

#[async_trait]
pub trait WindowLifecyclePort: Send + Sync {
    /// Subscribe to visibility events for the hosting window.
    ///
    /// Returns a receiver that yields events for as long as the window
    /// exists; the subscription ends when the receiver is dropped.
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<WindowVisibility>>;
}
