//! Fresh-Content Scanner (C5, Tier 1) and Trending Ingestor (C8, folded into Tier 1).

use chrono::{Datelike, Utc};
use ipguard_models::{IpTarget, Priority, QuotaOperation};
use ipguard_platform::PlatformClient;
use ipguard_store::QuotaRepository;
use tracing::{debug, warn};

use crate::budget::TierBudget;
use crate::error::DiscoveryError;
use crate::ip_catalog::union_keywords;
use crate::keyword_registry::KeywordRegistry;
use crate::processor::VideoProcessor;
use crate::report::TierReport;

const FRESH_LOOKBACK: chrono::Duration = chrono::Duration::hours(24);
const KEYWORDS_PER_IP: usize = 2;
const MAX_RESULTS_PER_SEARCH: u32 = 25;
const MAX_TRENDING_RESULTS: u32 = 50;

/// HIGH-priority IPs are split into two rotating groups so a 20%-budget tier can still
/// cover the whole HIGH set across two days (§4.5).
fn rotation_group(catalog: &[IpTarget], now: chrono::DateTime<Utc>) -> Vec<&IpTarget> {
    let day_parity = (now.date_naive().num_days_from_ce() % 2) as usize;
    catalog
        .iter()
        .filter(|t| t.priority == Priority::High)
        .enumerate()
        .filter(|(i, _)| i % 2 == day_parity)
        .map(|(_, t)| t)
        .collect()
}

fn candidate_keywords(target: &IpTarget) -> Vec<String> {
    let mut keywords: Vec<String> = target.character_names.clone();
    for character in &target.character_names {
        for tool in &target.ai_tool_keywords {
            keywords.push(format!("{character} {tool}"));
        }
    }
    keywords
}

pub async fn run(
    catalog: &[IpTarget],
    keyword_registry: &KeywordRegistry<'_>,
    quota: &QuotaRepository<'_>,
    platform: &dyn PlatformClient,
    processor: &VideoProcessor<'_>,
    trending_categories: &[String],
    mut budget: TierBudget,
) -> Result<(TierBudget, TierReport), DiscoveryError> {
    let mut report = TierReport::default();
    let now = Utc::now();

    for target in rotation_group(catalog, now) {
        if !budget.can_afford(QuotaOperation::Search.cost()) {
            break;
        }

        let mut stats = Vec::new();
        for keyword in candidate_keywords(target) {
            stats.push(keyword_registry.get_or_create(&keyword, target.priority).await?);
        }
        stats.sort_by(|a, b| b.match_rate().partial_cmp(&a.match_rate()).unwrap_or(std::cmp::Ordering::Equal));
        stats.truncate(KEYWORDS_PER_IP);

        for stat in stats {
            if !budget.can_afford(QuotaOperation::Search.cost()) {
                break;
            }
            if !quota.charge(QuotaOperation::Search).await? {
                debug!("global ledger exhausted mid tier-1 cycle");
                return Ok((budget, report));
            }
            budget.spend(QuotaOperation::Search.cost());
            report.quota_spent += QuotaOperation::Search.cost();

            let raw_videos = match platform.search_videos(&stat.keyword, now - FRESH_LOOKBACK, MAX_RESULTS_PER_SEARCH).await {
                Ok(videos) => videos,
                Err(e) => {
                    warn!(keyword = %stat.keyword, error = %e, "fresh-content search failed, skipping keyword");
                    report.errors += 1;
                    continue;
                }
            };

            let mut matches_found = 0u32;
            for raw in &raw_videos {
                match processor.process(raw, true).await {
                    Ok(outcome) => {
                        report.record(&outcome);
                        if outcome == crate::processor::ProcessOutcome::Persisted {
                            matches_found += 1;
                        }
                    }
                    Err(e) => {
                        warn!(video_id = %raw.video_id, error = %e, "fresh-content item failed, continuing batch");
                        report.errors += 1;
                    }
                }
            }
            keyword_registry.record_result(&stat.keyword, raw_videos.len() as u32, matches_found).await?;
        }
    }

    for category in trending_categories {
        if !budget.can_afford(QuotaOperation::Trending.cost()) {
            break;
        }
        if !quota.charge(QuotaOperation::Trending).await? {
            return Ok((budget, report));
        }
        budget.spend(QuotaOperation::Trending.cost());
        report.quota_spent += QuotaOperation::Trending.cost();

        let raw_videos = match platform.get_trending(category, MAX_TRENDING_RESULTS).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(category, error = %e, "trending fetch failed, skipping category");
                report.errors += 1;
                continue;
            }
        };

        let keywords = union_keywords(catalog);
        for raw in &raw_videos {
            let combined = format!("{} {}", raw.title, raw.description).to_lowercase();
            if !keywords.iter().any(|k| combined.contains(k.as_str())) {
                continue;
            }
            match processor.process(raw, true).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    warn!(video_id = %raw.video_id, error = %e, "trending item failed, continuing batch");
                    report.errors += 1;
                }
            }
        }
    }

    Ok((budget, report))
}
