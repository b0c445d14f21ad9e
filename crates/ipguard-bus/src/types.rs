//! The three message topics the discovery and analysis services exchange (§6).

use chrono::{DateTime, Utc};
use ipguard_models::{ChannelId, IpTargetId, RiskTier, VideoId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A topic is a Redis stream key plus the consumer-group semantics around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    VideoDiscovered,
    VideoHighRisk,
    VisionFeedback,
}

impl Topic {
    pub fn stream_key(self) -> &'static str {
        match self {
            Topic::VideoDiscovered => "stream:video-discovered",
            Topic::VideoHighRisk => "stream:video-high-risk",
            Topic::VisionFeedback => "stream:vision-feedback",
        }
    }
}

/// Envelope wrapping every published message: a unique id (used both for tracing and as
/// the idempotency dedup key) plus the publish timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message_id: Uuid,
    pub published_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            published_at: Utc::now(),
            payload,
        }
    }
}

/// Published by C2 once a video clears extraction, dedup, and IP matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDiscoveredPayload {
    pub video_id: VideoId,
    pub channel_id: ChannelId,
    pub title: String,
    pub initial_risk: u8,
    pub risk_tier: RiskTier,
    pub matched_ips: Vec<IpTargetId>,
    pub discovered_at: DateTime<Utc>,
}

/// The reason C12 published a `video-high-risk` message: either the video was already
/// above threshold at discovery time, or a rescore crossed the threshold upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighRiskReason {
    Initial,
    ThresholdCross,
}

/// Published by C11/C12 whenever a rescoring pass crosses into HIGH or CRITICAL.
/// `risk_update_seq` lets consumers discard superseded updates for the same video that
/// arrive out of order (§5 ordering note) and is the dedup key for at-least-once delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHighRiskPayload {
    pub video_id: VideoId,
    pub channel_id: ChannelId,
    pub risk_tier: RiskTier,
    pub current_risk: u8,
    pub reason: HighRiskReason,
    pub risk_update_seq: u64,
}

/// Published by the downstream vision analyzer once it has a verdict for a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionFeedbackPayload {
    pub video_id: VideoId,
    pub contains_infringement: bool,
    pub confidence: f64,
    pub characters_detected: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_keys_are_distinct() {
        let keys = [
            Topic::VideoDiscovered.stream_key(),
            Topic::VideoHighRisk.stream_key(),
            Topic::VisionFeedback.stream_key(),
        ];
        assert_eq!(keys.iter().collect::<std::collections::HashSet<_>>().len(), 3);
    }

    #[test]
    fn envelope_round_trips_with_fresh_message_id_per_instance() {
        let a = Envelope::new(VideoDiscoveredPayload {
            video_id: VideoId::from_raw("v1"),
            channel_id: ChannelId::from_raw("c1"),
            title: "test video".to_string(),
            initial_risk: 10,
            risk_tier: RiskTier::from_score(10),
            matched_ips: vec![],
            discovered_at: Utc::now(),
        });
        let b = Envelope::new(a.payload.clone());
        assert_ne!(a.message_id, b.message_id);

        let json = serde_json::to_string(&a).unwrap();
        let back: Envelope<VideoDiscoveredPayload> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message_id, a.message_id);
        assert_eq!(back.payload.video_id, a.payload.video_id);
    }
}
