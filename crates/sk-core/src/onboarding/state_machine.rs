//! Onboarding state machine.
//!
//! Defines a pure state transition function for the onboarding flow.
//! The completion side effects are emitted exactly on the edges into
//! [`OnboardingPhase::Completed`]; the phase enum carries the "already
//! signaled" fact instead of a separate flag.

use super::{OnboardingPhase, OnboardingState};

/// Events that drive the onboarding flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingEvent {
    /// The credentials check resolved. Probe failures are mapped to
    /// `authenticated: false` before they reach the machine.
    AuthResolved { authenticated: bool },
    /// The login form started sending a verification email.
    VerificationEmailRequested,
    /// The login form received a security challenge for the address.
    ChallengeIssued { email: String, code: String },
    /// The hosting window was hidden.
    WindowHidden,
    /// The hosting window was shown.
    WindowShown,
    /// The companion CLI is staged, either pre-existing or newly installed.
    CliStaged,
    /// The user toggled the CLI install checkbox.
    CliOptInChanged { opt_in: bool },
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingAction {
    /// Send the one-shot completion message to the privileged process.
    SignalCompletion { cli_opt_in: bool },
    /// Tell the parent shell that the user is now signed in.
    NotifyLoggedIn,
}

/// Pure onboarding state machine; no side effects.
pub struct OnboardingStateMachine;

impl OnboardingStateMachine {
    pub fn transition(
        mut state: OnboardingState,
        event: OnboardingEvent,
    ) -> (OnboardingState, Vec<OnboardingAction>) {
        match (state.phase.clone(), event) {
            (_, OnboardingEvent::CliStaged) => {
                state.cli_installed = true;
                (state, Vec::new())
            }
            (_, OnboardingEvent::CliOptInChanged { opt_in }) => {
                state.cli_opt_in = opt_in;
                (state, Vec::new())
            }
            // Completed is terminal: later credential results of either
            // polarity change nothing and emit nothing.
            (OnboardingPhase::Completed, OnboardingEvent::AuthResolved { .. }) => {
                (state, Vec::new())
            }
            (OnboardingPhase::Pending, OnboardingEvent::AuthResolved { authenticated: true }) => {
                // Signed in before the login form was ever used, so the
                // first render is already the returning variant.
                state.phase = OnboardingPhase::Completed;
                state.seen_welcome = true;
                let actions = Self::completion_actions(&state);
                (state, actions)
            }
            (OnboardingPhase::Pending, OnboardingEvent::AuthResolved { authenticated: false }) => {
                state.phase = OnboardingPhase::Authenticating;
                (state, Vec::new())
            }
            (
                OnboardingPhase::Authenticating
                | OnboardingPhase::SendingVerificationEmail
                | OnboardingPhase::Challenge { .. },
                OnboardingEvent::AuthResolved { authenticated: true },
            ) => {
                state.phase = OnboardingPhase::Completed;
                let actions = Self::completion_actions(&state);
                (state, actions)
            }
            (
                OnboardingPhase::Pending | OnboardingPhase::Authenticating,
                OnboardingEvent::VerificationEmailRequested,
            ) => {
                state.phase = OnboardingPhase::SendingVerificationEmail;
                (state, Vec::new())
            }
            (
                OnboardingPhase::Pending
                | OnboardingPhase::Authenticating
                | OnboardingPhase::SendingVerificationEmail,
                OnboardingEvent::ChallengeIssued { email, code },
            ) => {
                state.phase = OnboardingPhase::Challenge { email, code };
                (state, Vec::new())
            }
            (OnboardingPhase::Completed, OnboardingEvent::WindowHidden) => {
                // The user hid the window after signing in; the next render
                // greets them as already signed in.
                state.seen_welcome = true;
                (state, Vec::new())
            }
            (_state, _event) => (state, Vec::new()),
        }
    }

    fn completion_actions(state: &OnboardingState) -> Vec<OnboardingAction> {
        vec![
            OnboardingAction::SignalCompletion {
                cli_opt_in: state.cli_opt_in,
            },
            OnboardingAction::NotifyLoggedIn,
        ]
    }
}
