//! Core trait definitions for document persistence
//!
//! `DocumentStore` is the seam between the typed repositories and whatever
//! holds the bytes; `Document` is what a record type has to expose for the
//! repositories, the sitemap and the public listings to work with it.

use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A record stored in a named collection
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name in the backing store
    const COLLECTION: &'static str;

    /// Human-readable type name for error messages
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn slug(&self) -> &str;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Whether the record is visible to anonymous readers
    fn is_listed(&self) -> bool {
        true
    }
}

/// Storage operations for raw document collections
///
/// Implementations load and save whole collections; the repository layer on
/// top serializes read-modify-write cycles.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load every document of a collection; a missing collection is empty
    async fn load(&self, collection: &str) -> AppResult<Vec<Value>>;

    /// Replace the full contents of a collection
    async fn save(&self, collection: &str, documents: &[Value]) -> AppResult<()>;

    /// Ensure the storage location exists
    async fn ensure_ready(&self) -> AppResult<()>;
}
