//! Navigation and alert boundaries the login screen drives.

use crate::onboarding::RouteDecision;

/// Screens reachable from the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    HouseSelection,
    SignUp,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::HouseSelection => "HouseSelection",
            Self::SignUp => "SignUp",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<RouteDecision> for Route {
    fn from(decision: RouteDecision) -> Self {
        match decision {
            RouteDecision::Dashboard => Self::Dashboard,
            RouteDecision::HouseSelection => Self::HouseSelection,
        }
    }
}

/// The app's navigation stack.
pub trait Navigator: Send + Sync {
    /// Replace the whole stack with a single entry.
    fn reset_to(&self, route: Route);

    /// Push `route` on top of the current stack.
    fn navigate(&self, route: Route);
}

/// User-facing alert channel.
pub trait AlertSink: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}
