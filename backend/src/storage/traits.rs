//! # Storage Traits
//!
//! This module defines the document store abstraction that the domain layer
//! talks to. A store holds named collections of JSON documents addressed by a
//! string key, in the style of a hosted document database.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Field map of a single document
pub type Fields = Map<String, Value>;

/// A document read back from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

/// Trait defining the interface for document storage operations
///
/// Implementations are injected into the view services as
/// `Arc<dyn DocumentStore>`, so the domain layer never knows whether it is
/// talking to files, memory or a remote service.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in a collection, in key order
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Fetch one document, `None` when the key does not exist
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    /// Create a document, replacing any existing document with the same key
    async fn create(&self, collection: &str, key: &str, fields: Fields) -> Result<()>;

    /// Merge the given fields into an existing document
    ///
    /// Fails when the document does not exist.
    async fn update(&self, collection: &str, key: &str, patch: Fields) -> Result<()>;
}
