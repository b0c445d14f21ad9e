//! Cycle Orchestrator (C9): computes the per-cycle cap, allocates it across the three
//! tiers, and runs them in order with dynamic leftover rebalancing (§4.9).

use ipguard_models::IpTarget;
use ipguard_platform::PlatformClient;
use ipguard_store::{ChannelRepository, QuotaRepository, VideoRepository};
use tracing::info;

use crate::budget::TierBudget;
use crate::channel_registry::ChannelRegistry;
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::keyword_registry::KeywordRegistry;
use crate::processor::VideoProcessor;
use crate::report::CycleReport;
use crate::scanners::{channel_scanner, fresh_content, keyword_rotator};

/// Everything one orchestration cycle needs, bundled so `run_cycle` doesn't take a dozen
/// loose parameters.
pub struct CycleContext<'a> {
    pub catalog: &'a [IpTarget],
    pub quota: &'a QuotaRepository<'a>,
    pub videos: &'a VideoRepository<'a>,
    pub channels: &'a ChannelRepository<'a>,
    pub keyword_registry: &'a KeywordRegistry<'a>,
    pub channel_registry: &'a ChannelRegistry<'a>,
    pub bus: &'a ipguard_bus::BusClient,
    pub platform: &'a dyn PlatformClient,
    pub config: &'a DiscoveryConfig,
}

pub async fn run_cycle(ctx: &CycleContext<'_>) -> Result<CycleReport, DiscoveryError> {
    let remaining = ctx.quota.remaining().await?;
    let cap = remaining.min(ctx.config.max_per_cycle);
    if cap == 0 {
        info!("no quota remaining, skipping cycle");
        return Ok(CycleReport {
            budget_exhausted: true,
            ..Default::default()
        });
    }

    let alloc = &ctx.config.tier_allocations;
    let tier1_budget = TierBudget::new((cap as f64 * alloc.tier1) as u32);
    let tier2_budget = TierBudget::new((cap as f64 * alloc.tier2) as u32);
    let tier3_budget = TierBudget::new((cap as f64 * alloc.tier3) as u32);

    let processor = VideoProcessor {
        videos: ctx.videos,
        channels: ctx.channels,
        bus: ctx.bus,
        catalog: ctx.catalog,
        dedupe_window_days: ctx.config.dedupe_window_days,
        skip_no_ip_match: ctx.config.skip_no_ip_match,
    };

    let (tier1_spent, tier1_report) = fresh_content::run(
        ctx.catalog,
        ctx.keyword_registry,
        ctx.quota,
        ctx.platform,
        &processor,
        &ctx.config.trending_categories,
        tier1_budget,
    )
    .await?;

    let tier2_budget = TierBudget::new(tier2_budget.remaining() + tier1_spent.leftover());
    let (tier2_spent, tier2_report) =
        channel_scanner::run(ctx.channel_registry, ctx.quota, ctx.platform, &processor, tier2_budget).await?;

    // Tier 3 absorbs whatever Tier 1 and Tier 2 didn't spend, but never gives back (§4.9).
    let tier3_budget = TierBudget::new(tier3_budget.remaining() + tier2_spent.leftover());
    let (_tier3_spent, tier3_report) =
        keyword_rotator::run(ctx.keyword_registry, ctx.quota, ctx.platform, &processor, tier3_budget).await?;

    let report = CycleReport {
        tier1: tier1_report,
        tier2: tier2_report,
        tier3: tier3_report,
        budget_exhausted: false,
    };
    info!(
        persisted = report.total_persisted(),
        quota_spent = report.total_quota_spent(),
        "discovery cycle complete"
    );
    Ok(report)
}
