//! Infrastructure adapters for Skiff onboarding.
//!
//! Implementations of the sk-core ports backed by the local filesystem and
//! in-process channels. In the shipped app these sit behind the bridge to
//! the privileged host process; the contracts are the same either way.

pub mod app_dirs;
pub mod cli_install;
pub mod completion;
pub mod credentials;
pub mod window_events;

pub use cli_install::StagedCliInstaller;
pub use completion::{ChannelCompletionSignal, InstallationComplete};
pub use credentials::FileCredentialsProbe;
pub use window_events::WindowVisibilityHub;
