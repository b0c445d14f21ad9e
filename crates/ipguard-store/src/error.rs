//! Error taxonomy for the Firestore persistence layer (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("precondition failed: document was modified concurrently at {path}")]
    PreconditionFailed { path: String },

    #[error("firestore authentication failed: {0}")]
    Unauthorized(String),

    #[error("firestore request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("firestore token acquisition failed: {0}")]
    TokenAcquisition(String),

    #[error("failed to (de)serialize firestore document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("firestore returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("retry budget exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<StoreError>,
    },

    #[error("quota exceeded for operation: {0}")]
    QuotaExceeded(String),
}

impl StoreError {
    /// Network blips and Firestore-side contention are worth retrying; everything else
    /// (bad auth, malformed documents, genuine 404s) is not (§7).
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Request(e) => e.is_timeout() || e.is_connect() || e.status().map(|s| s.is_server_error()).unwrap_or(true),
            StoreError::PreconditionFailed { .. } => true,
            StoreError::NotFound(_)
            | StoreError::Unauthorized(_)
            | StoreError::TokenAcquisition(_)
            | StoreError::Serialization(_)
            | StoreError::UnexpectedResponse(_)
            | StoreError::RetryExhausted { .. }
            | StoreError::QuotaExceeded(_) => false,
        }
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed { .. })
    }
}
