//! Document store seam. The ingestion loop and the HTTP API only ever see
//! the `DocumentStore` trait; Cloudant is one implementation behind it.

pub mod cloudant;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use cloudant::CloudantStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected request (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Document '{0}' already exists")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A schemaless document collection addressable by id and by equality-style
/// selector queries. Single-document inserts only; no transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the backing database if missing. Safe to call repeatedly.
    async fn ensure_database(&self) -> Result<(), StoreError>;

    /// True if a document with this id is present.
    async fn exists(&self, doc_id: &str) -> Result<bool, StoreError>;

    /// Inserts a new document. Fails with `StoreError::Conflict` if the id
    /// is already taken (documents are immutable once stored).
    async fn insert(&self, doc_id: &str, doc: &Value) -> Result<(), StoreError>;

    /// Fetches one document by id, or `None` if absent.
    async fn get(&self, doc_id: &str) -> Result<Option<Value>, StoreError>;

    /// Selector query. `fields` projects the result documents when given.
    async fn find(
        &self,
        selector: Value,
        fields: Option<&[&str]>,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<Value>, StoreError>;
}
