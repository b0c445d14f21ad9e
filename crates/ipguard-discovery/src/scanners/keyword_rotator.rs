//! Keyword Rotation (C7, Tier 3). Tier 3 never gives back leftover budget to an earlier
//! tier (§4.9), so this is always run last.

use chrono::Utc;
use ipguard_models::QuotaOperation;
use ipguard_platform::PlatformClient;
use ipguard_store::QuotaRepository;
use tracing::warn;

use crate::budget::TierBudget;
use crate::error::DiscoveryError;
use crate::keyword_registry::KeywordRegistry;
use crate::processor::VideoProcessor;
use crate::report::TierReport;

const ROTATION_LOOKBACK: chrono::Duration = chrono::Duration::days(30);
const MAX_RESULTS_PER_SEARCH: u32 = 25;

pub async fn run(
    keyword_registry: &KeywordRegistry<'_>,
    quota: &QuotaRepository<'_>,
    platform: &dyn PlatformClient,
    processor: &VideoProcessor<'_>,
    mut budget: TierBudget,
) -> Result<(TierBudget, TierReport), DiscoveryError> {
    let mut report = TierReport::default();
    let now = Utc::now();

    let slots = (budget.remaining() / QuotaOperation::Search.cost()).max(1) as usize;
    let due = keyword_registry.due_for_search(slots).await?;

    for stat in due {
        if !budget.can_afford(QuotaOperation::Search.cost()) {
            break;
        }
        if !quota.charge(QuotaOperation::Search).await? {
            return Ok((budget, report));
        }
        budget.spend(QuotaOperation::Search.cost());
        report.quota_spent += QuotaOperation::Search.cost();

        let raw_videos = match platform.search_videos(&stat.keyword, now - ROTATION_LOOKBACK, MAX_RESULTS_PER_SEARCH).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(keyword = %stat.keyword, error = %e, "keyword rotation search failed, skipping keyword");
                report.errors += 1;
                continue;
            }
        };

        let mut matches_found = 0u32;
        for raw in &raw_videos {
            match processor.process(raw, false).await {
                Ok(outcome) => {
                    report.record(&outcome);
                    if outcome == crate::processor::ProcessOutcome::Persisted {
                        matches_found += 1;
                    }
                }
                Err(e) => {
                    warn!(video_id = %raw.video_id, error = %e, "keyword rotation item failed, continuing batch");
                    report.errors += 1;
                }
            }
        }
        keyword_registry.record_result(&stat.keyword, raw_videos.len() as u32, matches_found).await?;
    }

    Ok((budget, report))
}
