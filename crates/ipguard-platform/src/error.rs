//! Error taxonomy for the video platform client shim (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Request(String),

    #[error("platform rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("platform returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("video or channel not found: {0}")]
    NotFound(String),
}

impl PlatformError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlatformError::Request(_) | PlatformError::RateLimited { .. })
    }
}
