use thiserror::Error;

/// Enumeration of errors for operations against the collaborator stores.
/// Transient failures are not retried here; the invoking runtime owns
/// redelivery and backoff policy.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
