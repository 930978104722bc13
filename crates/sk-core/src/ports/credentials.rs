//! Credentials probe port
//!
//! Reports whether the persisted configuration resolves to a signed-in
//! user. Implementations are provided by the infrastructure layer.

use async_trait::async_trait;

#[async_trait]
pub trait CredentialsPort: Send + Sync {
    /// Whether persisted credentials resolve to a signed-in user.
    ///
    /// May fail when the credential store is unreadable; at this layer a
    /// failure is not distinguishable from "not logged in", so callers
    /// treat it as signed-out.
    async fn is_authenticated(&self) -> anyhow::Result<bool>;
}
