//! The two event handlers from §4.12: new-discovery promotion and vision-feedback intake.

use chrono::Utc;
use ipguard_bus::{BusClient, HighRiskReason, VisionFeedbackPayload};
use ipguard_models::{ProcessingState, RiskTier};
use ipguard_store::{ChannelRepository, VideoRepository, ViewSnapshotRepository};
use tracing::{info, warn};

use crate::error::AnalyzerError;
use crate::publish::publish_high_risk_if_due;
use crate::rescore::rescore_one;

/// §4.12 new-discovery handler: sets `current_risk := initial_risk` (a no-op in practice
/// since C2 already persisted them equal, but this is the one place that owns the field),
/// derives `next_scan_at` from the video's tier, and promotes straight to `video-high-risk`
/// if it's already above threshold at discovery time.
pub async fn handle_new_discovery(
    videos: &VideoRepository<'_>,
    bus: &BusClient,
    video_id: &str,
    high_risk_threshold: u8,
) -> Result<(), AnalyzerError> {
    let video = videos
        .update_with_cas(video_id, |v| {
            v.current_risk = v.initial_risk;
            v.risk_tier = RiskTier::from_score(v.current_risk);
            v.next_scan_at = Utc::now() + v.risk_tier.rescan_interval();
            v.last_risk_update = Utc::now();
        })
        .await?;

    if video.current_risk >= high_risk_threshold && video.processing_state == ProcessingState::Discovered {
        publish_high_risk_if_due(bus, &video, HighRiskReason::Initial).await?;
        videos
            .update_with_cas(video_id, |v| {
                v.processing_state = ProcessingState::Queued;
            })
            .await?;
    }
    Ok(())
}

/// §4.12 feedback handler: applies the downstream verdict, updates the channel's
/// infringement counters via `MarkScanned`, and immediately re-scores the video rather than
/// waiting for the next tick — a fresh verdict is exactly the kind of signal the rescore
/// loop exists to react to quickly.
pub async fn handle_vision_feedback(
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    bus: &BusClient,
    high_risk_threshold: u8,
    feedback: &VisionFeedbackPayload,
) -> Result<(), AnalyzerError> {
    let video = videos
        .update_with_cas(feedback.video_id.as_str(), |v| {
            v.gemini_result = Some(ipguard_models::GeminiResult {
                contains_infringement: feedback.contains_infringement,
                confidence: feedback.confidence,
                characters_detected: feedback.characters_detected.clone(),
                analyzed_at: Utc::now(),
            });
            v.processing_state = ProcessingState::Analyzed;
        })
        .await?;

    channels
        .update_with_cas(video.channel_id.as_str(), |c| {
            c.total_videos_scanned += 1;
            if feedback.contains_infringement {
                c.confirmed_infringements += 1;
            } else {
                c.videos_cleared += 1;
            }
            c.last_scanned_at = Some(Utc::now());
        })
        .await?;

    if let Err(e) = rescore_one(videos, channels, snapshots, bus, high_risk_threshold, feedback.video_id.as_str()).await {
        warn!(video_id = %feedback.video_id, error = %e, "immediate rescore after feedback failed");
    }

    info!(video_id = %feedback.video_id, contains_infringement = feedback.contains_infringement, "vision feedback applied");
    Ok(())
}
