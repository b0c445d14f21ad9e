//! Error taxonomy for the Redis Streams topic bus (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("failed to (de)serialize bus message: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("message {id} on stream {stream} has no payload field")]
    MissingPayload { stream: String, id: String },

    #[error("consumer group {group} is not registered on stream {stream}")]
    UnknownConsumerGroup { stream: String, group: String },
}

impl BusError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BusError::Connection(_))
    }
}
