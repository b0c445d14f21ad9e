//! Channel Re-Scan (C6, Tier 2).

use chrono::Utc;
use ipguard_models::QuotaOperation;
use ipguard_platform::PlatformClient;
use ipguard_store::QuotaRepository;
use tracing::warn;

use crate::budget::TierBudget;
use crate::channel_registry::ChannelRegistry;
use crate::error::DiscoveryError;
use crate::processor::{any_match_found, VideoProcessor};
use crate::report::TierReport;

const CHANNEL_LOOKBACK: chrono::Duration = chrono::Duration::days(14);
const MAX_UPLOADS_PER_CHANNEL: u32 = 25;

pub async fn run(
    channel_registry: &ChannelRegistry<'_>,
    quota: &QuotaRepository<'_>,
    platform: &dyn PlatformClient,
    processor: &VideoProcessor<'_>,
    mut budget: TierBudget,
) -> Result<(TierBudget, TierReport), DiscoveryError> {
    let mut report = TierReport::default();
    let now = Utc::now();

    // Channel docs are small; pull a generous batch and let the budget cap how many we
    // actually pay to scan this cycle (§4.6).
    let due = channel_registry.due_for_scan(200).await?;

    for channel in due {
        if !budget.can_afford(QuotaOperation::ChannelUploads.cost()) {
            break;
        }
        if !quota.charge(QuotaOperation::ChannelUploads).await? {
            return Ok((budget, report));
        }
        budget.spend(QuotaOperation::ChannelUploads.cost());
        report.quota_spent += QuotaOperation::ChannelUploads.cost();

        let raw_videos = match platform
            .get_channel_uploads(&channel.channel_id, now - CHANNEL_LOOKBACK, MAX_UPLOADS_PER_CHANNEL)
            .await
        {
            Ok(videos) => videos,
            Err(e) => {
                warn!(channel_id = %channel.channel_id, error = %e, "channel uploads fetch failed, skipping channel");
                report.errors += 1;
                continue;
            }
        };

        let mut outcomes = Vec::with_capacity(raw_videos.len());
        for raw in &raw_videos {
            match processor.process(raw, false).await {
                Ok(outcome) => {
                    report.record(&outcome);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(video_id = %raw.video_id, error = %e, "channel scan item failed, continuing batch");
                    report.errors += 1;
                }
            }
        }

        let had_infringement = any_match_found(&outcomes);
        if let Err(e) = channel_registry.mark_scanned(channel.channel_id.as_str(), had_infringement).await {
            warn!(channel_id = %channel.channel_id, error = %e, "failed to record channel scan outcome");
            report.errors += 1;
        }
    }

    Ok((budget, report))
}
