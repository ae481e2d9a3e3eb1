use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use tracing::instrument;

use sales_common::event::ObjectCreatedEvent;
use sales_common::records::{CleansedRecord, GoldenSummary};
use sales_common::store::{BlobStore, APPLICATION_JSON};

use crate::error::AggregateError;

/// Groups cleansed records by customer and overwrites one golden summary
/// per customer. The accumulator is invocation-local; concurrent
/// invocations overlapping on a customer race on the summary write and
/// the last writer wins. That is an accepted property of this pipeline,
/// not something this stage tries to repair.
pub struct Aggregator {
    blob_store: Arc<dyn BlobStore + Send + Sync>,
    golden_bucket: String,
}

/// Compute one customer's summary from the records seen in this batch.
/// `products_bought` is deduplicated preserving first-seen order;
/// `timestamps` keeps one entry per record, duplicates and order intact.
pub fn summarize(customer_id: &str, entries: &[CleansedRecord]) -> GoldenSummary {
    let mut products_bought: Vec<String> = Vec::new();
    for entry in entries {
        for product in entry.products.iter().flatten() {
            if !products_bought.contains(product) {
                products_bought.push(product.clone());
            }
        }
    }

    GoldenSummary {
        customer_id: customer_id.to_owned(),
        total_transactions: entries.len() as u64,
        total_spent: entries
            .iter()
            .map(|entry| entry.total_amount.unwrap_or(0.0))
            .sum(),
        products_bought,
        timestamps: entries
            .iter()
            .map(|entry| {
                entry
                    .ingested_at
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string())
            })
            .collect(),
    }
}

impl Aggregator {
    pub fn new(blob_store: Arc<dyn BlobStore + Send + Sync>, golden_bucket: &str) -> Self {
        Self {
            blob_store,
            golden_bucket: golden_bucket.to_owned(),
        }
    }

    /// Process one batch of cleansed object-created events. Unreadable or
    /// undecodable records are skipped individually; records without a
    /// customer_id are dropped with a warning. A failure while writing a
    /// summary aborts the remaining writes and propagates.
    #[instrument(skip_all, fields(batch_size = events.len()))]
    pub async fn handle_batch(&self, events: &[ObjectCreatedEvent]) -> Result<(), AggregateError> {
        tracing::info!("processing {} records from cleansed store", events.len());

        let mut by_customer: HashMap<String, Vec<CleansedRecord>> = HashMap::new();
        for event in events {
            let body = match self.blob_store.get_object(&event.bucket, &event.key).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::error!(key = %event.key, "failed to read cleansed object: {}", err);
                    counter!("aggregator_records_skipped_total").increment(1);
                    continue;
                }
            };
            let record: CleansedRecord = match serde_json::from_slice(&body) {
                Ok(record) => record,
                Err(err) => {
                    tracing::error!(key = %event.key, "failed to parse cleansed object: {}", err);
                    counter!("aggregator_records_skipped_total").increment(1);
                    continue;
                }
            };

            let Some(customer_id) = record.customer_id.clone() else {
                tracing::warn!(key = %event.key, "missing customer_id in record");
                counter!("aggregator_records_skipped_total").increment(1);
                continue;
            };

            by_customer.entry(customer_id).or_default().push(record);
        }

        if by_customer.is_empty() {
            tracing::warn!("no valid customer_id found in any record");
            return Ok(());
        }

        for (customer_id, entries) in &by_customer {
            tracing::info!(
                customer_id = %customer_id,
                "aggregating {} entries",
                entries.len()
            );

            let summary = summarize(customer_id, entries);
            let golden_key = format!("golden/{}/summary.json", customer_id);
            self.blob_store
                .put_object(
                    &self.golden_bucket,
                    &golden_key,
                    serde_json::to_vec(&summary)?,
                    APPLICATION_JSON,
                )
                .await?;

            counter!("aggregator_summaries_written_total").increment(1);
            tracing::info!(key = %golden_key, "golden summary written");
        }

        Ok(())
    }
}
