//! Read-only document store — point lookups by collection and id.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Decoded document fields.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// The collections the login flow reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Houses,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Houses => "houses",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-agnostic document lookup.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document. `Ok(None)` means the document does not exist.
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;
}
