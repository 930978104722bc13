//! Onboarding coordinator.
//!
//! Owns the onboarding state and sequences its collaborators: the
//! credentials check, the background CLI staging, window visibility
//! reconciliation, and the one-shot completion signal toward the
//! privileged process.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use sk_core::onboarding::{
    IntroView, OnboardingAction, OnboardingEvent, OnboardingState, OnboardingStateMachine,
};
use sk_core::ports::{
    CliToolPort, CompletionSignalPort, CredentialsPort, OnboardingEventPort, WindowLifecyclePort,
    WindowVisibility,
};
use sk_core::retry::RetryPolicy;

use super::StageCliTool;

/// Slide the tutorial opens on when the user proceeds past onboarding.
pub const TUTORIAL_FIRST_SLIDE: usize = 1;

/// Callbacks into the parent shell that owns the onboarding screen.
#[async_trait::async_trait]
pub trait ShellNotifier: Send + Sync {
    /// The user finished signing in.
    async fn login_completed(&self, logged_in: bool);

    /// The user asked to start the tutorial at the given slide.
    async fn tutorial_started(&self, slide: usize);
}

/// Errors produced when starting the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingStartError {
    #[error("window lifecycle subscription failed: {0}")]
    Subscribe(#[source] anyhow::Error),
}

/// Dependency bundle for constructing the coordinator.
pub struct OnboardingCoordinatorDeps {
    pub credentials: Arc<dyn CredentialsPort>,
    pub cli_tool: Arc<dyn CliToolPort>,
    pub completion: Arc<dyn CompletionSignalPort>,
    pub window: Arc<dyn WindowLifecyclePort>,
    pub shell: Arc<dyn ShellNotifier>,
    pub events: Arc<dyn OnboardingEventPort>,
    pub retry: RetryPolicy,
}

/// Coordinator that drives onboarding state and side effects.
pub struct OnboardingCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    // Serializes dispatches; every mutation happens under this lock.
    state: Mutex<OnboardingState>,
    credentials: Arc<dyn CredentialsPort>,
    stage_cli: StageCliTool,
    completion: Arc<dyn CompletionSignalPort>,
    window: Arc<dyn WindowLifecyclePort>,
    shell: Arc<dyn ShellNotifier>,
    events: Arc<dyn OnboardingEventPort>,
    shutdown_tx: watch::Sender<bool>,
}

impl OnboardingCoordinator {
    pub fn new(
        credentials: Arc<dyn CredentialsPort>,
        cli_tool: Arc<dyn CliToolPort>,
        completion: Arc<dyn CompletionSignalPort>,
        window: Arc<dyn WindowLifecyclePort>,
        shell: Arc<dyn ShellNotifier>,
        events: Arc<dyn OnboardingEventPort>,
        retry: RetryPolicy,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(CoordinatorInner {
                state: Mutex::new(OnboardingState::default()),
                credentials,
                stage_cli: StageCliTool::new(cli_tool, retry),
                completion,
                window,
                shell,
                events,
                shutdown_tx,
            }),
        }
    }

    /// Construct a coordinator from a dependency bundle.
    pub fn from_deps(deps: OnboardingCoordinatorDeps) -> Self {
        let OnboardingCoordinatorDeps {
            credentials,
            cli_tool,
            completion,
            window,
            shell,
            events,
            retry,
        } = deps;

        Self::new(
            credentials, cli_tool, completion, window, shell, events, retry,
        )
    }

    /// Begin onboarding: subscribe to window visibility, then kick off the
    /// credentials check and the CLI staging concurrently. Neither task
    /// awaits the other; a slow staging must not delay the signed-in
    /// render.
    pub async fn start(&self) -> Result<(), OnboardingStartError> {
        let mut visibility = self
            .inner
            .window
            .subscribe()
            .await
            .map_err(OnboardingStartError::Subscribe)?;

        let inner = self.inner.clone();
        let mut shutdown = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    event = visibility.recv() => match event {
                        Some(WindowVisibility::Hidden) => {
                            inner.dispatch(OnboardingEvent::WindowHidden).await;
                        }
                        Some(WindowVisibility::Shown) => {
                            // The render layer reads state directly.
                            inner.dispatch(OnboardingEvent::WindowShown).await;
                        }
                        None => break,
                    },
                }
            }
        });

        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.run_credentials_check().await;
        });

        let inner = self.inner.clone();
        let shutdown = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            if inner.stage_cli.execute(shutdown).await {
                inner.dispatch(OnboardingEvent::CliStaged).await;
            }
        });

        Ok(())
    }

    /// Current render model for the onboarding screen.
    pub async fn current_view(&self) -> IntroView {
        self.inner.state.lock().await.view()
    }

    /// Snapshot of the raw onboarding state.
    pub async fn state(&self) -> OnboardingState {
        self.inner.state.lock().await.clone()
    }

    /// The login form started sending a verification email.
    pub async fn begin_email_verification(&self) {
        self.inner
            .dispatch(OnboardingEvent::VerificationEmailRequested)
            .await;
    }

    /// The login form received a security challenge for the given address.
    pub async fn present_challenge(&self, email: String, code: String) {
        self.inner
            .dispatch(OnboardingEvent::ChallengeIssued { email, code })
            .await;
    }

    /// Re-run the credentials check after an external verification event.
    pub async fn recheck_authentication(&self) {
        self.inner.run_credentials_check().await;
    }

    /// The user toggled the CLI install checkbox.
    pub async fn set_cli_opt_in(&self, opt_in: bool) {
        self.inner
            .dispatch(OnboardingEvent::CliOptInChanged { opt_in })
            .await;
    }

    /// The user asked to proceed into the tutorial.
    pub async fn start_tutorial(&self) {
        self.inner.shell.tutorial_started(TUTORIAL_FIRST_SLIDE).await;
    }

    /// Stop issuing state updates. Results of probes or staging attempts
    /// that arrive after this call are discarded.
    pub fn teardown(&self) {
        // send_replace delivers even when no task is subscribed yet
        self.inner.shutdown_tx.send_replace(true);
    }
}

impl CoordinatorInner {
    async fn run_credentials_check(&self) {
        let authenticated = match self.credentials.is_authenticated().await {
            Ok(authenticated) => authenticated,
            Err(err) => {
                // Indistinguishable from "not logged in" at this layer.
                warn!(error = %err, "credentials probe failed, treating as signed out");
                false
            }
        };
        self.dispatch(OnboardingEvent::AuthResolved { authenticated })
            .await;
    }

    async fn dispatch(&self, event: OnboardingEvent) {
        if *self.shutdown_tx.borrow() {
            debug!(?event, "dropping onboarding event after teardown");
            return;
        }

        let span = info_span!("usecase.onboarding.dispatch", event = ?event);
        async {
            let mut state = self.state.lock().await;
            let from = state.clone();
            let (next, actions) = OnboardingStateMachine::transition(from.clone(), event);
            if next.phase != from.phase {
                info!(from = ?from.phase, to = ?next.phase, "onboarding state transition");
            }
            *state = next.clone();
            // Actions run under the state lock so the completion signal is
            // ordered before any later event is applied.
            self.execute_actions(actions).await;
            self.events.emit_onboarding_state_changed(next.view()).await;
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(&self, actions: Vec<OnboardingAction>) {
        for action in actions {
            debug!(?action, "onboarding executing action");
            match action {
                OnboardingAction::SignalCompletion { cli_opt_in } => {
                    // Sent even when staging never finished; the receiving
                    // process decides whether the opt-in is actionable.
                    if let Err(err) = self
                        .completion
                        .signal_installation_complete(cli_opt_in)
                        .await
                    {
                        warn!(error = %err, "completion signal failed");
                    }
                }
                OnboardingAction::NotifyLoggedIn => {
                    self.shell.login_completed(true).await;
                }
            }
        }
    }
}
