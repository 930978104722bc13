//! Onboarding use cases
//!
//! This module contains the coordinator that drives the onboarding flow
//! and the background use case that stages the companion CLI.

pub mod coordinator;
pub mod stage_cli;

pub use coordinator::{
    OnboardingCoordinator, OnboardingCoordinatorDeps, OnboardingStartError, ShellNotifier,
    TUTORIAL_FIRST_SLIDE,
};
pub use stage_cli::StageCliTool;
