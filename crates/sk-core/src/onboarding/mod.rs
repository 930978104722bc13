//! Onboarding domain models
//!
//! This module defines the core domain models for the onboarding flow,
//! which guides a user through signing in and optionally installing the
//! companion CLI tool.

pub mod state_machine;

pub use state_machine::{OnboardingAction, OnboardingEvent, OnboardingStateMachine};

/// Phase of the onboarding flow.
///
/// `Completed` is terminal: once entered it is never left for the lifetime
/// of the coordinator, which is what makes the completion signal one-shot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OnboardingPhase {
    /// Initial; the credentials check is in flight.
    Pending,
    /// Credentials resolved signed-out; the login form is active.
    Authenticating,
    /// A verification email is being sent for the entered address.
    SendingVerificationEmail,
    /// A security challenge was presented; waiting for the user to follow
    /// the emailed steps.
    Challenge { email: String, code: String },
    /// Signed in; completion has been signaled.
    Completed,
}

/// Onboarding flow state
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OnboardingState {
    pub phase: OnboardingPhase,
    /// Whether the companion CLI is staged on disk.
    pub cli_installed: bool,
    /// Whether the user wants the CLI installed alongside the app.
    pub cli_opt_in: bool,
    /// Whether the user has already seen the first-time welcome. A window
    /// hide after sign-in counts as having seen it.
    pub seen_welcome: bool,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self {
            phase: OnboardingPhase::Pending,
            cli_installed: false,
            cli_opt_in: true,
            seen_welcome: false,
        }
    }
}

impl OnboardingState {
    /// Render model derived from the current state.
    pub fn view(&self) -> IntroView {
        match &self.phase {
            OnboardingPhase::Pending | OnboardingPhase::Authenticating => IntroView::Login {
                cli_opt_in: self.cli_opt_in,
            },
            OnboardingPhase::SendingVerificationEmail => IntroView::SendingVerificationEmail,
            OnboardingPhase::Challenge { email, code } => IntroView::SecurityChallenge {
                email: email.clone(),
                code: code.clone(),
            },
            OnboardingPhase::Completed if self.seen_welcome => IntroView::WelcomeBack,
            OnboardingPhase::Completed => IntroView::Welcome,
        }
    }
}

/// What the onboarding screen renders for a given state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum IntroView {
    /// Login form plus the CLI install checkbox.
    Login { cli_opt_in: bool },
    /// "Sending an email for the verification of your address..."
    SendingVerificationEmail,
    /// Email sent; show the address and the token the user must match.
    SecurityChallenge { email: String, code: String },
    /// First-time "you're now signed in" message.
    Welcome,
    /// Returning "you're already logged in" message.
    WelcomeBack,
}
