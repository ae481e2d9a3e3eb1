use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::instrument;

use sales_common::event::QueueMessage;
use sales_common::store::Queue;

/// Consumes dead-letter queue messages for operator inspection. The only
/// guaranteed behavior is decode-and-log at error severity; re-invoking
/// the original processing is out of scope.
pub struct Reprocessor {
    queue: Arc<dyn Queue + Send + Sync>,
}

impl Reprocessor {
    pub fn new(queue: Arc<dyn Queue + Send + Sync>) -> Self {
        Self { queue }
    }

    /// Process one batch of dead-letter messages. A decode failure on one
    /// message is logged and never halts the rest of the batch. Every
    /// message is acknowledged once inspected, decoded or not.
    #[instrument(skip_all, fields(batch_size = messages.len()))]
    pub async fn handle_batch(&self, messages: &[QueueMessage]) {
        for message in messages {
            match serde_json::from_str::<Value>(&message.body) {
                Ok(payload) => {
                    tracing::error!(payload = %payload, "processing dead-letter record");
                    counter!("reprocessor_messages_inspected_total").increment(1);
                }
                Err(err) => {
                    tracing::error!("failed to decode dead-letter record: {}", err);
                    counter!("reprocessor_messages_undecodable_total").increment(1);
                }
            }

            // Acknowledgment is best-effort; the runtime will redeliver
            // anything left unacknowledged.
            if let Err(err) = self.queue.delete_message(&message.receipt).await {
                tracing::warn!("failed to acknowledge dead-letter message: {}", err);
            }
        }
    }
}
