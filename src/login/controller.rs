//! LoginController — turns one submit into exactly one alert or one
//! navigation reset.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{CredentialGate, IdentityToolkitAuthenticator, Session};
use crate::config::LoginConfig;
use crate::error::{ALERT_TITLE, ConfigError, LoginError};
use crate::navigation::{AlertSink, Navigator, Route};
use crate::onboarding::{OnboardingResolver, RouteDecision};
use crate::store::FirestoreStore;

/// Clears the in-flight flag when the attempt ends, however it ends.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Screen-level controller for the sign-in form.
pub struct LoginController {
    gate: CredentialGate,
    resolver: OnboardingResolver,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn AlertSink>,
    in_flight: AtomicBool,
}

impl LoginController {
    pub fn new(
        gate: CredentialGate,
        resolver: OnboardingResolver,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            gate,
            resolver,
            navigator,
            alerts,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Wire the REST authenticator and document store from `config`, sharing
    /// one [`Session`] between them.
    pub fn from_config(
        config: &LoginConfig,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<Self, ConfigError> {
        let session = Arc::new(Session::new());
        let authenticator = IdentityToolkitAuthenticator::from_config(config, Arc::clone(&session))?;
        let store = FirestoreStore::from_config(config, session)?;

        Ok(Self::new(
            CredentialGate::new(Arc::new(authenticator)),
            OnboardingResolver::new(Arc::new(store), config.lookup_failure_policy),
            navigator,
            alerts,
        ))
    }

    /// Whether a submit is currently running.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Handle the login button.
    ///
    /// On success the navigation stack is reset to the resolved route. On
    /// failure a single alert is raised, except for [`LoginError::InFlight`],
    /// which is returned silently when another submit has not finished yet.
    pub async fn submit(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<RouteDecision, LoginError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Ignoring submit while another attempt is in flight");
            return Err(LoginError::InFlight);
        };

        let attempt_id = Uuid::new_v4();
        let outcome = self
            .attempt(identifier, secret)
            .instrument(tracing::info_span!("login_attempt", %attempt_id))
            .await;

        match &outcome {
            Ok(decision) => {
                let route = Route::from(*decision);
                tracing::info!(%attempt_id, %route, "Login succeeded");
                self.navigator.reset_to(route);
            }
            Err(e) => {
                tracing::info!(%attempt_id, error = %e, "Login failed");
                if let Some(message) = e.user_message() {
                    self.alerts.alert(ALERT_TITLE, message);
                }
            }
        }

        outcome
    }

    async fn attempt(&self, identifier: &str, secret: &str) -> Result<RouteDecision, LoginError> {
        let principal = self.gate.authenticate(identifier, secret).await?;
        let decision = self.resolver.resolve(&principal).await?;
        Ok(decision)
    }

    /// "Forgot your password?" link. Recovery is not offered; the control is inert.
    pub fn forgot_password(&self) {
        tracing::debug!("Password recovery requested; not available");
    }

    /// "Register now" link.
    pub fn open_sign_up(&self) {
        self.navigator.navigate(Route::SignUp);
    }
}
