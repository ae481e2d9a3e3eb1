use sales_common::error::StoreError;
use thiserror::Error;

/// Enumeration of errors raised while cleansing landing objects. All of
/// them abort the whole batch and propagate to the caller.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("landing object {key} has no string raw_data field")]
    MissingRawData { key: String },
    #[error("failed to decode landing payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
