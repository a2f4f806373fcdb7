//! Onboarding resolution — decides where a freshly signed-in user lands.
//!
//! The user's profile document is fetched first; if it references a house,
//! the house document is fetched next. Only a profile pointing at an existing
//! house reaches the dashboard. Every other combination means onboarding is
//! incomplete and routes to house selection.

pub mod model;
pub mod resolver;
pub mod state;

pub use model::{RouteDecision, UserProfile};
pub use resolver::OnboardingResolver;
pub use state::ResolutionState;
