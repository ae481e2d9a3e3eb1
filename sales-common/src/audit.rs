//! Append-only audit trail for propagation attempts. Writes are
//! best-effort: a failure to append is logged by the caller, never
//! propagated as a pipeline failure.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AuditStatus {
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "fail")]
    Fail,
}

/// One propagation attempt and its outcome. `target` is the destination
/// URI for successful writes, `"N/A"` for a failed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub event_id: Uuid,
    pub event_type: String,
    pub status: AuditStatus,
    pub target: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        event_type: &str,
        status: AuditStatus,
        target: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event_type.to_owned(),
            status,
            target: target.to_owned(),
            timestamp,
        }
    }
}

fn serialize_datetime<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
}

#[async_trait]
pub trait AuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Audit sink fake holding appended entries for inspection.
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .expect("memory audit sink lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("memory audit sink lock poisoned")
            .push(entry);
        Ok(())
    }
}
