//! Shared rescoring core: fetch video + channel + velocity, re-run C11, persist, and
//! publish if the update crosses the HIGH threshold upward (§4.12).

use chrono::Utc;
use ipguard_bus::{BusClient, HighRiskReason};
use ipguard_models::ViewSnapshot;
use ipguard_risk::velocity::{velocity, LOOKBACK};
use ipguard_store::{ChannelRepository, VideoRepository, ViewSnapshotRepository};
use tracing::info;

use crate::error::AnalyzerError;
use crate::publish::publish_high_risk_if_due;

/// Re-scores a single video against its already-persisted view-snapshot history (no new
/// platform fetch, no new snapshot written) — used by the feedback handler, where the
/// verdict itself is the signal worth reacting to immediately rather than view growth.
pub async fn rescore_one(
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    bus: &BusClient,
    high_risk_threshold: u8,
    video_id: &str,
) -> Result<(), AnalyzerError> {
    apply_rescore(videos, channels, snapshots, bus, high_risk_threshold, video_id).await
}

/// Records a fresh view-count snapshot (from a just-completed platform fetch) and re-scores
/// — used by the periodic tick.
pub async fn rescore_with_fresh_views(
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    bus: &BusClient,
    high_risk_threshold: u8,
    video_id: &str,
    fresh_view_count: u64,
) -> Result<(), AnalyzerError> {
    let snapshot = ViewSnapshot::new(video_id.into(), fresh_view_count, Utc::now());
    snapshots.record(&snapshot).await?;
    apply_rescore(videos, channels, snapshots, bus, high_risk_threshold, video_id).await
}

async fn apply_rescore(
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    bus: &BusClient,
    high_risk_threshold: u8,
    video_id: &str,
) -> Result<(), AnalyzerError> {
    let now = Utc::now();
    let video = videos.get(video_id).await?.ok_or_else(|| AnalyzerError::VideoNotFound(video_id.to_string()))?;
    let channel = channels
        .get(video.channel_id.as_str())
        .await?
        .ok_or_else(|| AnalyzerError::VideoNotFound(format!("channel {} for video {video_id}", video.channel_id)))?;

    let recent = snapshots.recent_for_video(video_id, now - LOOKBACK).await?;
    let velocity_result = velocity(now, video.view_count, &recent);

    let prior = if video.has_clean_analysis_history() {
        video.gemini_result.as_ref()
    } else {
        None
    };
    let outcome = ipguard_risk::rescore(&video, &channel, velocity_result, prior, now);

    let updated = videos
        .update_with_cas(video_id, |v| {
            v.push_risk_history(ipguard_models::RiskHistoryEntry {
                ts: now,
                prev_risk: outcome.previous_risk,
                new_risk: outcome.new_risk,
                factor_contributions: outcome.factor_contributions.clone(),
                reason: "rescore".to_string(),
            });
            v.current_risk = outcome.new_risk;
            v.risk_tier = outcome.tier;
            v.view_velocity = Some(velocity_result.views_per_hour);
            v.last_risk_update = now;
            v.next_scan_at = now + outcome.tier.rescan_interval();
        })
        .await?;

    info!(video_id, previous = outcome.previous_risk, new = outcome.new_risk, tier = ?outcome.tier, "rescored video");

    if outcome.new_risk >= high_risk_threshold && outcome.previous_risk < high_risk_threshold {
        publish_high_risk_if_due(bus, &updated, HighRiskReason::ThresholdCross).await?;
    }
    Ok(())
}
