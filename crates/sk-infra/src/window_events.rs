//! Window visibility fan-out.
//!
//! The shell publishes hide/show events here; the onboarding coordinator
//! subscribes through the [`WindowLifecyclePort`] contract.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use sk_core::ports::{WindowLifecyclePort, WindowVisibility};

const SUBSCRIBER_QUEUE_DEPTH: usize = 16;

#[derive(Default)]
pub struct WindowVisibilityHub {
    subscribers: Mutex<Vec<mpsc::Sender<WindowVisibility>>>,
}

impl WindowVisibilityHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a visibility event to every live subscriber. Subscribers
    /// whose receiver is gone are pruned.
    pub async fn publish(&self, event: WindowVisibility) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|tx| match tx.try_send(event) {
            Ok(()) => true,
            // A slow subscriber keeps its slot and misses the event.
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[async_trait]
impl WindowLifecyclePort for WindowVisibilityHub {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<WindowVisibility>> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        self.subscribers.lock().await.push(tx);
        Ok(rx)
    }
}
