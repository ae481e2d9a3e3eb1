use sales_common::error::StoreError;
use thiserror::Error;

/// Enumeration of errors raised while writing golden summaries. Read and
/// decode failures on individual cleansed records are isolated (skipped
/// with a log line) and never reach this type; only the summary write
/// phase is fatal.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("failed to encode golden summary: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
