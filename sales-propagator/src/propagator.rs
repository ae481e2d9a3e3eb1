use std::sync::Arc;

use chrono::Datelike;
use metrics::counter;
use serde_json::Value;
use tracing::instrument;

use sales_common::audit::{AuditEntry, AuditSink, AuditStatus};
use sales_common::event::{ChangeEvent, ChangeEventType};
use sales_common::store::{BlobStore, APPLICATION_JSON};
use sales_common::time::TimeSource;

use crate::error::PropagateError;

/// Propagates record store change events into the landing blob store,
/// one dated JSON blob per INSERT/MODIFY, with an audit entry per attempt.
pub struct Propagator {
    blob_store: Arc<dyn BlobStore + Send + Sync>,
    audit: Arc<dyn AuditSink + Send + Sync>,
    timesource: Arc<dyn TimeSource + Send + Sync>,
    landing_bucket: String,
}

impl Propagator {
    pub fn new(
        blob_store: Arc<dyn BlobStore + Send + Sync>,
        audit: Arc<dyn AuditSink + Send + Sync>,
        timesource: Arc<dyn TimeSource + Send + Sync>,
        landing_bucket: &str,
    ) -> Self {
        Self {
            blob_store,
            audit,
            timesource,
            landing_bucket: landing_bucket.to_owned(),
        }
    }

    /// Process one batch of change events in arrival order. The first
    /// failure appends a single `"fail"` audit entry and aborts the batch;
    /// writes that already completed stay committed.
    #[instrument(skip_all, fields(batch_size = events.len()))]
    pub async fn handle_batch(&self, events: &[ChangeEvent]) -> Result<(), PropagateError> {
        for event in events {
            match event.event_type {
                ChangeEventType::Insert | ChangeEventType::Modify => {}
                other => {
                    tracing::debug!("ignoring {} event", other.as_str());
                    counter!("propagator_events_ignored_total").increment(1);
                    continue;
                }
            }

            if let Err(err) = self.propagate(event).await {
                tracing::error!("error processing change batch: {}", err);
                self.append_audit(event.event_type.as_str(), AuditStatus::Fail, "N/A")
                    .await;
                return Err(err);
            }
        }

        Ok(())
    }

    async fn propagate(&self, event: &ChangeEvent) -> Result<(), PropagateError> {
        tracing::info!("processing {} event", event.event_type.as_str());

        let image = event.plain_image()?;
        let id = image
            .get("id")
            .and_then(Value::as_str)
            .ok_or(PropagateError::MissingRecordId)?
            .to_owned();

        let now = self.timesource.now();
        let key = format!(
            "{}/{:02}/{:02}/{}.json",
            now.year(),
            now.month(),
            now.day(),
            id
        );
        let body = serde_json::to_vec(&Value::Object(image))?;

        self.blob_store
            .put_object(&self.landing_bucket, &key, body, APPLICATION_JSON)
            .await?;

        let target = format!("blob://{}/{}", self.landing_bucket, key);
        self.append_audit(event.event_type.as_str(), AuditStatus::Sent, &target)
            .await;

        counter!("propagator_records_landed_total").increment(1);
        tracing::info!(key = %key, "written to landing store");
        Ok(())
    }

    /// Audit writes are best-effort: a failure here is logged and never
    /// surfaced as a pipeline failure.
    async fn append_audit(&self, event_type: &str, status: AuditStatus, target: &str) {
        let entry = AuditEntry::new(event_type, status, target, self.timesource.now());
        if let Err(err) = self.audit.append(entry).await {
            tracing::warn!("failed to append audit entry: {}", err);
        }
    }
}
