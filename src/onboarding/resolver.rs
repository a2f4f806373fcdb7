//! OnboardingResolver — decides the post-login route from the user's profile
//! and household documents.

use std::sync::Arc;

use crate::auth::Principal;
use crate::config::LookupFailurePolicy;
use crate::error::StoreError;
use crate::store::{Collection, DocumentStore};

use super::model::{RouteDecision, UserProfile};
use super::state::ResolutionState;

/// Runs the profile → house lookup chain for an authenticated principal.
///
/// Lookups are strictly sequential and short-circuit on the first absent
/// document or missing reference; at most two fetches per call.
pub struct OnboardingResolver {
    store: Arc<dyn DocumentStore>,
    policy: LookupFailurePolicy,
}

impl OnboardingResolver {
    pub fn new(store: Arc<dyn DocumentStore>, policy: LookupFailurePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> LookupFailurePolicy {
        self.policy
    }

    /// Resolve where `principal` should land.
    ///
    /// Absence at any step yields [`RouteDecision::HouseSelection`]. A store
    /// failure is returned as `Err` under
    /// [`LookupFailurePolicy::FailClosed`] and downgraded to
    /// `HouseSelection` under [`LookupFailurePolicy::FailOpen`].
    pub async fn resolve(&self, principal: &Principal) -> Result<RouteDecision, StoreError> {
        match self.run(principal).await {
            Ok(decision) => {
                tracing::info!(uid = %principal.uid, route = %decision, "Onboarding resolved");
                Ok(decision)
            }
            Err(e) => match self.policy {
                LookupFailurePolicy::FailClosed => Err(e),
                LookupFailurePolicy::FailOpen => {
                    tracing::warn!(
                        uid = %principal.uid,
                        error = %e,
                        "Onboarding lookup failed, routing to house selection"
                    );
                    Ok(RouteDecision::HouseSelection)
                }
            },
        }
    }

    async fn run(&self, principal: &Principal) -> Result<RouteDecision, StoreError> {
        let mut state = ResolutionState::default();
        loop {
            let next = self.step(&state, principal).await?;
            debug_assert!(
                state.can_transition_to(&next),
                "invalid resolution transition {state:?} -> {next:?}"
            );
            tracing::debug!(from = state.label(), to = next.label(), "Resolution step");
            state = next;

            if state.is_terminal() {
                if let Some(decision) = state.decision() {
                    return Ok(decision);
                }
            }
        }
    }

    async fn step(
        &self,
        state: &ResolutionState,
        principal: &Principal,
    ) -> Result<ResolutionState, StoreError> {
        use ResolutionState::*;

        let next = match state {
            Start => match self.store.get_by_id(Collection::Users, &principal.uid).await? {
                Some(doc) => ProfileFetched {
                    house_id: UserProfile::from_document(&doc).house_id,
                },
                None => Resolved(RouteDecision::HouseSelection),
            },
            ProfileFetched { house_id: None } => Resolved(RouteDecision::HouseSelection),
            ProfileFetched {
                house_id: Some(house_id),
            } => HouseChecked {
                exists: self
                    .store
                    .get_by_id(Collection::Houses, house_id)
                    .await?
                    .is_some(),
            },
            HouseChecked { exists: true } => Resolved(RouteDecision::Dashboard),
            HouseChecked { exists: false } => Resolved(RouteDecision::HouseSelection),
            Resolved(decision) => Resolved(*decision),
        };
        Ok(next)
    }
}
