use sales_common::error::StoreError;
use sales_common::event::AttributeError;
use thiserror::Error;

/// Enumeration of errors raised while propagating change events to the
/// landing store. All of them are batch-fatal: the surrounding runtime
/// routes the triggering batch to the dead-letter queue.
#[derive(Error, Debug)]
pub enum PropagateError {
    #[error("change image has no string id field")]
    MissingRecordId,
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error("failed to encode landing payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
