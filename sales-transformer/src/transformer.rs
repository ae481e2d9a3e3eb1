use std::sync::Arc;

use metrics::counter;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use sales_common::event::ObjectCreatedEvent;
use sales_common::records::CleansedRecord;
use sales_common::store::{BlobStore, APPLICATION_JSON};

use crate::error::TransformError;

/// The decoded `raw_data` payload. Extra fields are ignored, absent ones
/// stay `None`; the projection below is the only shaping that happens.
/// `raw_data` is strict JSON end to end: the generator writes it with
/// serde_json and this stage decodes it the same way.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPayload {
    customer_id: Option<String>,
    products: Option<Vec<String>>,
    total_amount: Option<f64>,
    timestamp: Option<String>,
}

/// Projects landing objects onto the four-field cleansed schema and writes
/// them at the mirrored key path.
pub struct Transformer {
    blob_store: Arc<dyn BlobStore + Send + Sync>,
    cleansed_bucket: String,
}

impl Transformer {
    pub fn new(blob_store: Arc<dyn BlobStore + Send + Sync>, cleansed_bucket: &str) -> Self {
        Self {
            blob_store,
            cleansed_bucket: cleansed_bucket.to_owned(),
        }
    }

    /// Process one batch of landing object-created events in arrival
    /// order. Any failure aborts the entire batch; there is no per-record
    /// isolation at this stage.
    #[instrument(skip_all, fields(batch_size = events.len()))]
    pub async fn handle_batch(&self, events: &[ObjectCreatedEvent]) -> Result<(), TransformError> {
        for event in events {
            tracing::info!(key = %event.key, "processing landing object");

            let body = self.blob_store.get_object(&event.bucket, &event.key).await?;
            let landing: Value = serde_json::from_slice(&body)?;
            let raw_data = landing
                .get("raw_data")
                .and_then(Value::as_str)
                .ok_or_else(|| TransformError::MissingRawData {
                    key: event.key.clone(),
                })?;
            let payload: RawPayload = serde_json::from_str(raw_data)?;

            let cleansed = CleansedRecord {
                customer_id: payload.customer_id,
                products: payload.products,
                total_amount: payload.total_amount,
                ingested_at: payload.timestamp,
            };

            let cleansed_key = event.key.replace("landing", "cleansed");
            self.blob_store
                .put_object(
                    &self.cleansed_bucket,
                    &cleansed_key,
                    serde_json::to_vec(&cleansed)?,
                    APPLICATION_JSON,
                )
                .await?;

            counter!("transformer_records_cleansed_total").increment(1);
            tracing::info!(key = %cleansed_key, "written to cleansed store");
        }

        Ok(())
    }
}
