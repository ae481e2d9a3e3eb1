use sales_common::error::StoreError;
use thiserror::Error;

/// Enumeration of errors raised while generating synthetic transactions.
/// All of them are fatal for the invocation; the caller decides whether to
/// reschedule.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to encode raw_data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
