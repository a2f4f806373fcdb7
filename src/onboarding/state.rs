//! Resolution state machine — tracks how far the lookup chain has got.

use super::model::RouteDecision;

/// States of a single resolution.
///
/// Start → ProfileFetched → HouseChecked → Resolved, with early exits to
/// `Resolved(HouseSelection)` from `Start` and `ProfileFetched`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// Holds the principal's uid; nothing fetched yet.
    Start,
    /// Profile exists; carries its house reference, if any.
    ProfileFetched { house_id: Option<String> },
    /// House lookup completed.
    HouseChecked { exists: bool },
    Resolved(RouteDecision),
}

impl ResolutionState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &ResolutionState) -> bool {
        use ResolutionState::*;
        match (self, target) {
            (Start, ProfileFetched { .. }) => true,
            (Start, Resolved(RouteDecision::HouseSelection)) => true,
            (ProfileFetched { house_id: Some(_) }, HouseChecked { .. }) => true,
            (ProfileFetched { house_id: None }, Resolved(RouteDecision::HouseSelection)) => true,
            (HouseChecked { exists: true }, Resolved(RouteDecision::Dashboard)) => true,
            (HouseChecked { exists: false }, Resolved(RouteDecision::HouseSelection)) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn decision(&self) -> Option<RouteDecision> {
        match self {
            Self::Resolved(d) => Some(*d),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ProfileFetched { .. } => "profile_fetched",
            Self::HouseChecked { .. } => "house_checked",
            Self::Resolved(_) => "resolved",
        }
    }
}

impl Default for ResolutionState {
    fn default() -> Self {
        Self::Start
    }
}
