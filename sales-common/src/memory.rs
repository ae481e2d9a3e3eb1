//! In-memory store implementations, used by tests and by the local
//! pipeline runner. Each fake records the events the managed runtime
//! would deliver for its writes; callers drain them with the `take_*`
//! methods and feed them to the next handler.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::event::{AttributeValue, ChangeEvent, ChangeEventType, ObjectCreatedEvent, QueueMessage};
use crate::store::{BlobStore, ObjectInfo, Queue, RecordStore};

#[derive(Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
    last_modified: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct BlobStoreInner {
    buckets: HashMap<String, HashMap<String, StoredObject>>,
    created_events: Vec<ObjectCreatedEvent>,
}

/// Blob store fake backed by nested maps. Objects are immutable only by
/// convention, like the real landing/cleansed stores; a second put for the
/// same key overwrites, which is what the golden store relies on.
#[derive(Default)]
pub struct MemoryBlobStore {
    inner: Mutex<BlobStoreInner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the object-created events recorded since the last call.
    pub fn take_created_events(&self) -> Vec<ObjectCreatedEvent> {
        let mut inner = self.inner.lock().expect("memory blob store lock poisoned");
        std::mem::take(&mut inner.created_events)
    }

    /// Content type recorded for an object, for assertions in tests.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().expect("memory blob store lock poisoned");
        inner
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.lock().expect("memory blob store lock poisoned");
        inner
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.body.clone())
            .ok_or_else(|| StoreError::ObjectNotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory blob store lock poisoned");
        inner.buckets.entry(bucket.to_owned()).or_default().insert(
            key.to_owned(),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
                last_modified: Utc::now(),
            },
        );
        inner.created_events.push(ObjectCreatedEvent {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        });
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>, StoreError> {
        let inner = self.inner.lock().expect("memory blob store lock poisoned");
        let mut objects: Vec<ObjectInfo> = inner
            .buckets
            .get(bucket)
            .map(|objects| {
                objects
                    .iter()
                    .map(|(key, object)| ObjectInfo {
                        key: key.clone(),
                        last_modified: object.last_modified,
                    })
                    .collect()
            })
            .unwrap_or_default();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}

#[derive(Default)]
struct RecordStoreInner {
    items: HashMap<String, HashMap<String, String>>,
    change_events: Vec<ChangeEvent>,
}

/// Record store fake. A put for a new key synthesizes an INSERT change
/// event, a put for an existing key a MODIFY, with every field wrapped as
/// an `S`-tagged attribute the way the change stream delivers them.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<RecordStoreInner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the change events recorded since the last call.
    pub fn take_change_events(&self) -> Vec<ChangeEvent> {
        let mut inner = self
            .inner
            .lock()
            .expect("memory record store lock poisoned");
        std::mem::take(&mut inner.change_events)
    }

    pub fn item_count(&self) -> usize {
        let inner = self
            .inner
            .lock()
            .expect("memory record store lock poisoned");
        inner.items.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put_item(
        &self,
        key: &str,
        _sort_key: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .lock()
            .expect("memory record store lock poisoned");
        let event_type = if inner.items.contains_key(key) {
            ChangeEventType::Modify
        } else {
            ChangeEventType::Insert
        };
        let new_image = fields
            .iter()
            .map(|(name, value)| (name.clone(), AttributeValue::String(value.clone())))
            .collect();
        inner.items.insert(key.to_owned(), fields);
        inner.change_events.push(ChangeEvent {
            event_type,
            new_image,
        });
        Ok(())
    }
}

#[derive(Default)]
struct QueueInner {
    messages: Vec<QueueMessage>,
}

/// Dead-letter queue fake. Tests push bodies in; the reprocessor deletes
/// by receipt.
#[derive(Default)]
pub struct MemoryQueue {
    inner: Mutex<QueueInner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&self, body: &str) -> QueueMessage {
        let message = QueueMessage {
            body: body.to_owned(),
            receipt: Uuid::now_v7().to_string(),
        };
        let mut inner = self.inner.lock().expect("memory queue lock poisoned");
        inner.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> Vec<QueueMessage> {
        let inner = self.inner.lock().expect("memory queue lock poisoned");
        inner.messages.clone()
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn delete_message(&self, receipt: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory queue lock poisoned");
        inner.messages.retain(|message| message.receipt != receipt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::APPLICATION_JSON;

    #[tokio::test]
    async fn blob_store_records_created_events() {
        let store = MemoryBlobStore::new();
        store
            .put_object("landing", "2024/01/02/a.json", b"{}".to_vec(), APPLICATION_JSON)
            .await
            .unwrap();

        let events = store.take_created_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bucket, "landing");
        assert_eq!(events[0].key, "2024/01/02/a.json");
        // Drained once, gone.
        assert!(store.take_created_events().is_empty());

        let body = store.get_object("landing", "2024/01/02/a.json").await.unwrap();
        assert_eq!(body, b"{}");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = MemoryBlobStore::new();
        let result = store.get_object("landing", "nope.json").await;
        assert!(matches!(result, Err(StoreError::ObjectNotFound { .. })));
    }

    #[tokio::test]
    async fn record_store_emits_insert_then_modify() {
        let store = MemoryRecordStore::new();
        let fields = HashMap::from([("id".to_string(), "k1".to_string())]);
        store.put_item("k1", "2024-01-02T00:00:00", fields.clone()).await.unwrap();
        store.put_item("k1", "2024-01-02T00:00:01", fields).await.unwrap();

        let events = store.take_change_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, ChangeEventType::Insert);
        assert_eq!(events[1].event_type, ChangeEventType::Modify);
        assert_eq!(
            events[0].new_image.get("id"),
            Some(&AttributeValue::String("k1".to_string()))
        );
    }

    #[tokio::test]
    async fn queue_delete_acknowledges_by_receipt() {
        let queue = MemoryQueue::new();
        let first = queue.push_message("{}");
        queue.push_message("{\"a\":1}");

        queue.delete_message(&first.receipt).await.unwrap();
        let remaining = queue.messages();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].body, "{\"a\":1}");
    }
}
