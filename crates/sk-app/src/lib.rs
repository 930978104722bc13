//! Skiff application orchestration layer
//!
//! This crate contains the onboarding use cases and runtime orchestration.

pub mod usecases;

pub use usecases::onboarding::{
    OnboardingCoordinator, OnboardingCoordinatorDeps, OnboardingStartError, ShellNotifier,
    StageCliTool, TUTORIAL_FIRST_SLIDE,
};
