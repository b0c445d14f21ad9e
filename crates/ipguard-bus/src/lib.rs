//! Redis Streams topic bus connecting discovery, risk analysis, and the downstream
//! vision analyzer.

pub mod client;
pub mod error;
pub mod types;

pub use client::BusClient;
pub use error::BusError;
pub use types::{Envelope, HighRiskReason, Topic, VideoDiscoveredPayload, VideoHighRiskPayload, VisionFeedbackPayload};
