//! §4.12 rescore tick: fetches due videos, spends the `rescan_quota` sub-budget on fresh
//! `video_details` lookups, and re-scores each one.

use chrono::Utc;
use ipguard_bus::BusClient;
use ipguard_models::QuotaOperation;
use ipguard_platform::PlatformClient;
use ipguard_store::{ChannelRepository, QuotaRepository, VideoRepository, ViewSnapshotRepository};
use tracing::warn;

use crate::error::AnalyzerError;
use crate::rescore::rescore_with_fresh_views;

pub struct TickReport {
    pub videos_considered: u32,
    pub videos_rescored: u32,
    pub errors: u32,
    pub budget_exhausted: bool,
}

pub async fn run_rescore_tick(
    videos: &VideoRepository<'_>,
    channels: &ChannelRepository<'_>,
    snapshots: &ViewSnapshotRepository<'_>,
    rescan_quota: &QuotaRepository<'_>,
    platform: &dyn PlatformClient,
    bus: &BusClient,
    high_risk_threshold: u8,
    batch_size: i32,
) -> Result<TickReport, AnalyzerError> {
    let mut report = TickReport {
        videos_considered: 0,
        videos_rescored: 0,
        errors: 0,
        budget_exhausted: false,
    };

    let due = videos.due_for_rescan(Utc::now(), batch_size).await?;
    for video in due {
        report.videos_considered += 1;

        if !rescan_quota.charge(QuotaOperation::VideoDetails).await? {
            report.budget_exhausted = true;
            break;
        }

        let fresh = match platform.get_video_details(&[video.video_id.clone().into_string()]).await {
            Ok(mut results) => results.pop(),
            Err(e) => {
                warn!(video_id = %video.video_id, error = %e, "video_details fetch failed, skipping this tick");
                report.errors += 1;
                continue;
            }
        };
        let Some(fresh) = fresh else {
            warn!(video_id = %video.video_id, "video_details returned no row, platform may have removed it");
            report.errors += 1;
            continue;
        };

        match rescore_with_fresh_views(
            videos,
            channels,
            snapshots,
            bus,
            high_risk_threshold,
            video.video_id.as_str(),
            fresh.view_count,
        )
        .await
        {
            Ok(()) => report.videos_rescored += 1,
            Err(e) => {
                warn!(video_id = %video.video_id, error = %e, "rescore failed, will retry next tick");
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
