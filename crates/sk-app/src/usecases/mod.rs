//! Business logic use cases

pub mod onboarding;

pub use onboarding::{OnboardingCoordinator, ShellNotifier};
