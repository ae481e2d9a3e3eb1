use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Content type for every blob payload written by the pipeline.
pub const APPLICATION_JSON: &str = "application/json";

/// Metadata for one stored object, as returned by `list_objects`.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// A bucketed blob store. Implementations are injected into each handler
/// so tests can substitute the in-memory fake.
#[async_trait]
pub trait BlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>, StoreError>;
}

/// A keyed record store with a sort key per partition. Change events for
/// inserts and modifications are delivered to the propagator by the
/// surrounding runtime.
#[async_trait]
pub trait RecordStore {
    async fn put_item(
        &self,
        key: &str,
        sort_key: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), StoreError>;
}

/// The dead-letter queue. Message delivery is a push from the surrounding
/// runtime; acknowledgment is an explicit delete by receipt.
#[async_trait]
pub trait Queue {
    async fn delete_message(&self, receipt: &str) -> Result<(), StoreError>;
}
