use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex, Notify};

use sk_app::usecases::onboarding::{
    OnboardingCoordinator, OnboardingCoordinatorDeps, ShellNotifier,
};
use sk_core::onboarding::{IntroView, OnboardingPhase};
use sk_core::ports::{CliToolPort, CredentialsPort, OnboardingEventPort, WindowVisibility};
use sk_core::retry::RetryPolicy;
use sk_infra::{ChannelCompletionSignal, InstallationComplete, WindowVisibilityHub};

struct ScriptedCredentials {
    results: Mutex<VecDeque<bool>>,
}

impl ScriptedCredentials {
    fn new(results: impl IntoIterator<Item = bool>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CredentialsPort for ScriptedCredentials {
    async fn is_authenticated(&self) -> anyhow::Result<bool> {
        Ok(self.results.lock().await.pop_front().unwrap_or(false))
    }
}

/// Credentials probe that blocks until released, for teardown races.
struct DelayedCredentials {
    release: Notify,
    authenticated: bool,
}

#[async_trait]
impl CredentialsPort for DelayedCredentials {
    async fn is_authenticated(&self) -> anyhow::Result<bool> {
        self.release.notified().await;
        Ok(self.authenticated)
    }
}

struct FailingCredentials;

#[async_trait]
impl CredentialsPort for FailingCredentials {
    async fn is_authenticated(&self) -> anyhow::Result<bool> {
        anyhow::bail!("host bridge unavailable")
    }
}

struct CountingCliTool {
    installed: bool,
    failures_before_success: usize,
    probe_calls: AtomicUsize,
    stage_calls: AtomicUsize,
}

impl CountingCliTool {
    fn new(installed: bool, failures_before_success: usize) -> Self {
        Self {
            installed,
            failures_before_success,
            probe_calls: AtomicUsize::new(0),
            stage_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CliToolPort for CountingCliTool {
    async fn is_installed(&self) -> anyhow::Result<bool> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.installed)
    }

    async fn stage_install(&self) -> anyhow::Result<()> {
        let call = self.stage_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            anyhow::bail!("staging directory not writable");
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingShell {
    logins: Mutex<Vec<bool>>,
}

#[async_trait]
impl ShellNotifier for RecordingShell {
    async fn login_completed(&self, logged_in: bool) {
        self.logins.lock().await.push(logged_in);
    }

    async fn tutorial_started(&self, _slide: usize) {}
}

#[derive(Default)]
struct RecordingEvents {
    views: Mutex<Vec<IntroView>>,
}

#[async_trait]
impl OnboardingEventPort for RecordingEvents {
    async fn emit_onboarding_state_changed(&self, view: IntroView) {
        self.views.lock().await.push(view);
    }
}

struct Fixture {
    coordinator: OnboardingCoordinator,
    completion_rx: mpsc::Receiver<InstallationComplete>,
    shell: Arc<RecordingShell>,
    events: Arc<RecordingEvents>,
    hub: Arc<WindowVisibilityHub>,
    cli: Arc<CountingCliTool>,
}

fn fixture(credentials: Arc<dyn CredentialsPort>, cli: Arc<CountingCliTool>) -> Fixture {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let (completion, completion_rx) = ChannelCompletionSignal::channel(8);
    let shell = Arc::new(RecordingShell::default());
    let events = Arc::new(RecordingEvents::default());
    let hub = Arc::new(WindowVisibilityHub::new());

    let coordinator = OnboardingCoordinator::from_deps(OnboardingCoordinatorDeps {
        credentials,
        cli_tool: cli.clone(),
        completion: Arc::new(completion),
        window: hub.clone(),
        shell: shell.clone(),
        events: events.clone(),
        retry: RetryPolicy::default(),
    });

    Fixture {
        coordinator,
        completion_rx,
        shell,
        events,
        hub,
        cli,
    }
}

/// Let spawned coordinator tasks run; under paused time this advances the
/// clock only far enough to drain ready work.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn drain(rx: &mut mpsc::Receiver<InstallationComplete>) -> Vec<InstallationComplete> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test(start_paused = true)]
async fn already_authenticated_completes_once_with_one_message() {
    let credentials = Arc::new(ScriptedCredentials::new([true, true]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    assert_eq!(
        drain(&mut fx.completion_rx),
        vec![InstallationComplete { cli_opt_in: true }]
    );
    assert_eq!(*fx.shell.logins.lock().await, vec![true]);
    // Signed in before the screen was ever used: returning variant.
    assert_eq!(fx.coordinator.current_view().await, IntroView::WelcomeBack);

    // A later positive check must not fire again.
    fx.coordinator.recheck_authentication().await;
    settle().await;

    assert!(drain(&mut fx.completion_rx).is_empty());
    assert_eq!(fx.shell.logins.lock().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn sign_in_after_initial_signed_out_shows_first_time_welcome() {
    let credentials = Arc::new(ScriptedCredentials::new([false, true]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;
    assert_eq!(
        fx.coordinator.current_view().await,
        IntroView::Login { cli_opt_in: true }
    );
    assert!(drain(&mut fx.completion_rx).is_empty());

    fx.coordinator.recheck_authentication().await;
    settle().await;

    assert_eq!(fx.coordinator.current_view().await, IntroView::Welcome);
    assert_eq!(drain(&mut fx.completion_rx).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn preinstalled_cli_is_never_staged() {
    let credentials = Arc::new(ScriptedCredentials::new([false]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    assert_eq!(fx.cli.probe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.cli.stage_calls.load(Ordering::SeqCst), 0);
    assert!(fx.coordinator.state().await.cli_installed);
}

#[tokio::test(start_paused = true)]
async fn completion_is_independent_of_staging_retries() {
    let credentials = Arc::new(ScriptedCredentials::new([true]));
    let cli = Arc::new(CountingCliTool::new(false, 1));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    // Completion already signaled while staging sits in its first backoff.
    assert_eq!(drain(&mut fx.completion_rx).len(), 1);
    assert!(!fx.coordinator.state().await.cli_installed);

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(fx.coordinator.state().await.cli_installed);
    assert_eq!(fx.cli.stage_calls.load(Ordering::SeqCst), 2);
    assert!(drain(&mut fx.completion_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhausted_staging_never_surfaces_and_leaves_installed_false() {
    let credentials = Arc::new(ScriptedCredentials::new([true]));
    let cli = Arc::new(CountingCliTool::new(false, usize::MAX));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    // Enough for the whole backoff schedule (1+2+4+8 seconds).
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(fx.cli.stage_calls.load(Ordering::SeqCst), 5);
    assert!(!fx.coordinator.state().await.cli_installed);
    // Sign-in completed regardless.
    assert_eq!(drain(&mut fx.completion_rx).len(), 1);
    assert_eq!(*fx.shell.logins.lock().await, vec![true]);
}

#[tokio::test(start_paused = true)]
async fn hide_then_show_switches_to_the_returning_welcome() {
    let credentials = Arc::new(ScriptedCredentials::new([false, true]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    // Hiding before sign-in leaves the flag alone.
    fx.hub.publish(WindowVisibility::Hidden).await;
    settle().await;
    assert!(!fx.coordinator.state().await.seen_welcome);

    fx.coordinator.recheck_authentication().await;
    settle().await;
    assert_eq!(fx.coordinator.current_view().await, IntroView::Welcome);

    fx.hub.publish(WindowVisibility::Hidden).await;
    settle().await;
    assert_eq!(fx.coordinator.current_view().await, IntroView::WelcomeBack);

    fx.hub.publish(WindowVisibility::Shown).await;
    settle().await;
    assert_eq!(fx.coordinator.current_view().await, IntroView::WelcomeBack);
}

#[tokio::test(start_paused = true)]
async fn teardown_discards_a_late_probe_result() {
    let credentials = Arc::new(DelayedCredentials {
        release: Notify::new(),
        authenticated: true,
    });
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let mut fx = fixture(credentials.clone(), cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    fx.coordinator.teardown();
    credentials.release.notify_one();
    settle().await;

    assert_eq!(fx.coordinator.state().await.phase, OnboardingPhase::Pending);
    assert!(drain(&mut fx.completion_rx).is_empty());
    assert!(fx.shell.logins.lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn challenge_flow_defers_completion_until_a_recheck_succeeds() {
    let credentials = Arc::new(ScriptedCredentials::new([false, true]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    fx.coordinator.begin_email_verification().await;
    assert_eq!(
        fx.coordinator.current_view().await,
        IntroView::SendingVerificationEmail
    );

    fx.coordinator
        .present_challenge("user@example.com".into(), "Brave Otter".into())
        .await;
    assert_eq!(
        fx.coordinator.current_view().await,
        IntroView::SecurityChallenge {
            email: "user@example.com".into(),
            code: "Brave Otter".into(),
        }
    );
    assert!(drain(&mut fx.completion_rx).is_empty());

    fx.coordinator.recheck_authentication().await;
    settle().await;

    assert_eq!(drain(&mut fx.completion_rx).len(), 1);
    assert_eq!(fx.coordinator.current_view().await, IntroView::Welcome);
}

#[tokio::test(start_paused = true)]
async fn probe_failure_reads_as_signed_out() {
    let credentials = Arc::new(FailingCredentials);
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let mut fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;

    assert_eq!(
        fx.coordinator.state().await.phase,
        OnboardingPhase::Authenticating
    );
    assert!(drain(&mut fx.completion_rx).is_empty());
    assert!(fx.shell.logins.lock().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn every_applied_event_emits_a_render_state() {
    let credentials = Arc::new(ScriptedCredentials::new([false]));
    let cli = Arc::new(CountingCliTool::new(true, 0));
    let fx = fixture(credentials, cli);

    fx.coordinator.start().await.unwrap();
    settle().await;
    fx.coordinator.set_cli_opt_in(false).await;

    let current = fx.coordinator.current_view().await;
    let views = fx.events.views.lock().await;
    assert!(!views.is_empty());
    assert_eq!(*views.last().unwrap(), current);
}
