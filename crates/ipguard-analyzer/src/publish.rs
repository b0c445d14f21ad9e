//! Idempotent `video-high-risk` publishing (§5 idempotence, §6 payload shape).

use ipguard_bus::{BusClient, HighRiskReason, Topic, VideoHighRiskPayload};
use ipguard_models::Video;
use tracing::debug;

use crate::error::AnalyzerError;

/// The payload schema has no dedicated sequence field, so `last_risk_update`'s millisecond
/// timestamp serves as `risk_update_seq`: strictly non-decreasing across updates to the same
/// video (CAS-serialized, §5), which is all the dedup consumer needs to discard stale
/// redeliveries.
fn risk_update_seq(video: &Video) -> u64 {
    video.last_risk_update.timestamp_millis().max(0) as u64
}

/// Publishes to `video-high-risk` unless a message with the same `(video_id, seq)` has
/// already gone out, guarding against duplicate publishes from CAS retries or redelivery.
pub async fn publish_high_risk_if_due(bus: &BusClient, video: &Video, reason: HighRiskReason) -> Result<(), AnalyzerError> {
    let seq = risk_update_seq(video);
    let dedup_key = format!("video-high-risk:{}:{}", video.video_id, seq);
    if !bus.claim_dedup_key(&dedup_key).await? {
        debug!(video_id = %video.video_id, seq, "video-high-risk already published for this update, skipping");
        return Ok(());
    }

    bus.publish(
        Topic::VideoHighRisk,
        VideoHighRiskPayload {
            video_id: video.video_id.clone(),
            channel_id: video.channel_id.clone(),
            risk_tier: video.risk_tier,
            current_risk: video.current_risk,
            reason,
            risk_update_seq: seq,
        },
    )
    .await?;
    debug!(video_id = %video.video_id, risk = video.current_risk, reason = ?reason, "published video-high-risk");
    Ok(())
}
