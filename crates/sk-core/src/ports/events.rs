//! Onboarding render-state emission port

use crate::onboarding::IntroView;

/// Emits the derived render model toward the presentation layer after
/// every applied onboarding event.
#[async_trait::async_trait]
pub trait OnboardingEventPort: Send + Sync {
    async fn emit_onboarding_state_changed(&self, view: IntroView);
}
