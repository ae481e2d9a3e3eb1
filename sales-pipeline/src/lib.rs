//! Local end-to-end wiring of the pipeline over the in-memory stores.
//! Each pass plays the role of the managed event runtime: it drains the
//! events one stage produced and hands them to the next handler in order.

use std::sync::Arc;

use anyhow::Context;

use sales_aggregator::aggregator::Aggregator;
use sales_common::audit::MemoryAuditSink;
use sales_common::memory::{MemoryBlobStore, MemoryRecordStore};
use sales_common::time::{SystemTime, TimeSource};
use sales_generator::generator::generate_batch;
use sales_propagator::propagator::Propagator;
use sales_transformer::transformer::Transformer;

/// Counts from one full pipeline pass, for logging and assertions.
#[derive(Debug, Clone, Copy)]
pub struct PassSummary {
    pub generated: usize,
    pub landed: usize,
    pub cleansed: usize,
    pub summaries: usize,
}

pub struct Pipeline {
    pub record_store: Arc<MemoryRecordStore>,
    pub blob_store: Arc<MemoryBlobStore>,
    pub audit: Arc<MemoryAuditSink>,
    timesource: Arc<dyn TimeSource + Send + Sync>,
    propagator: Propagator,
    transformer: Transformer,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(landing_bucket: &str, cleansed_bucket: &str, golden_bucket: &str) -> Self {
        let record_store = Arc::new(MemoryRecordStore::new());
        let blob_store = Arc::new(MemoryBlobStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let timesource: Arc<dyn TimeSource + Send + Sync> = Arc::new(SystemTime {});

        let propagator = Propagator::new(
            blob_store.clone(),
            audit.clone(),
            timesource.clone(),
            landing_bucket,
        );
        let transformer = Transformer::new(blob_store.clone(), cleansed_bucket);
        let aggregator = Aggregator::new(blob_store.clone(), golden_bucket);

        Self {
            record_store,
            blob_store,
            audit,
            timesource,
            propagator,
            transformer,
            aggregator,
        }
    }

    /// Run one full pass: generate, propagate, transform, aggregate.
    pub async fn run_once(&self) -> anyhow::Result<PassSummary> {
        let generated = generate_batch(self.record_store.clone(), self.timesource.as_ref())
            .await
            .context("failed to generate transactions")?;

        let change_events = self.record_store.take_change_events();
        self.propagator
            .handle_batch(&change_events)
            .await
            .context("failed to propagate change events")?;

        let landing_events = self.blob_store.take_created_events();
        self.transformer
            .handle_batch(&landing_events)
            .await
            .context("failed to cleanse landing objects")?;

        let cleansed_events = self.blob_store.take_created_events();
        self.aggregator
            .handle_batch(&cleansed_events)
            .await
            .context("failed to aggregate cleansed records")?;

        // Drain the golden writes so the next pass starts clean.
        let golden_events = self.blob_store.take_created_events();

        Ok(PassSummary {
            generated,
            landed: landing_events.len(),
            cleansed: cleansed_events.len(),
            summaries: golden_events.len(),
        })
    }
}
