//! Onboarding data models.

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Where the user lands after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    /// Profile and household are both in place.
    Dashboard,
    /// Onboarding incomplete: the user still has to pick or create a house.
    HouseSelection,
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::HouseSelection => write!(f, "HouseSelection"),
        }
    }
}

/// The part of a user's profile document the login flow consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "houseId", default, skip_serializing_if = "Option::is_none")]
    pub house_id: Option<String>,
}

impl UserProfile {
    /// Read the profile out of a raw document.
    ///
    /// A `houseId` that is missing, empty, or not a string yields `None`.
    pub fn from_document(doc: &Document) -> Self {
        let house_id = doc
            .get(fields::HOUSE_ID)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        Self { house_id }
    }
}

/// Document field names read by the login flow.
pub mod fields {
    /// Profile field that references the user's household.
    pub const HOUSE_ID: &str = "houseId";
}
