//! The Video Processor (C2): extract → dedupe → match-IP → score → persist → publish.
//!
//! Called by every scanner, always with pre-fetched batches — no scanner calls the
//! platform from inside this function (§4.2 contract).

use std::collections::BTreeSet;

use chrono::Utc;
use ipguard_bus::{BusClient, Topic, VideoDiscoveredPayload};
use ipguard_models::{IpTarget, IpTargetId, ProcessingState, RiskTier, Video};
use ipguard_platform::RawVideo;
use ipguard_risk::initial::{initial_risk, InitialScoringInput};
use ipguard_store::{ChannelRepository, VideoRepository};
use tracing::{info, warn};

use crate::duration::parse_iso8601_duration_seconds;
use crate::error::DiscoveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Persisted,
    SkippedNoIpMatch,
    SkippedDuplicate,
}

pub struct VideoProcessor<'a> {
    pub videos: &'a VideoRepository<'a>,
    pub channels: &'a ChannelRepository<'a>,
    pub bus: &'a BusClient,
    pub catalog: &'a [IpTarget],
    pub dedupe_window_days: i64,
    pub skip_no_ip_match: bool,
}

impl<'a> VideoProcessor<'a> {
    /// Runs one raw platform record through the full pipeline. `trending_boost` is true
    /// when the record came from Tier-1 (fresh-content scan or trending ingestor), which
    /// earns the `+20` viral prior (§4.5, §4.8).
    pub async fn process(&self, raw: &RawVideo, trending_boost: bool) -> Result<ProcessOutcome, DiscoveryError> {
        let duration_seconds = match parse_iso8601_duration_seconds(&raw.duration_iso8601) {
            Some(s) => s,
            None => {
                warn!(video_id = %raw.video_id, raw_duration = %raw.duration_iso8601, "malformed duration, defaulting to 0");
                0
            }
        };

        let combined_lower = format!(
            "{} {} {} {}",
            raw.title, raw.description, raw.tags.join(" "), raw.channel_title
        )
        .to_lowercase();
        let matched_ips = match_ip_targets(&combined_lower, self.catalog);

        if matched_ips.is_empty() && self.skip_no_ip_match {
            return Ok(ProcessOutcome::SkippedNoIpMatch);
        }

        let now = Utc::now();
        let existing = self.videos.get(&raw.video_id).await?;
        if let Some(existing) = &existing {
            if now - existing.discovered_at < chrono::Duration::days(self.dedupe_window_days) {
                return Ok(ProcessOutcome::SkippedDuplicate);
            }
        }

        let channel = self
            .channels
            .get_or_create(raw.channel_id.as_str(), &raw.channel_title, now)
            .await?;

        let title_lower = raw.title.to_lowercase();
        let description_lower = raw.description.to_lowercase();
        let (character_match_in_title, ai_tool_match_in_title, generic_franchise_match_in_title) =
            title_signal(&title_lower, self.catalog);
        let (ai_tool_mentions_in_description, generic_ai_mention_in_description) = description_signal(&description_lower, self.catalog);
        let matched_tag_count = tag_match_count(&raw.tags, self.catalog);

        let scoring_input = InitialScoringInput {
            title: &raw.title,
            description: &raw.description,
            view_count: raw.view_count,
            matched_tag_count,
            character_match_in_title,
            ai_tool_match_in_title,
            generic_franchise_match_in_title,
            ai_tool_mentions_in_description,
            generic_ai_mention_in_description,
            recorded_as_trending: trending_boost,
        };
        let (score, contributions) = initial_risk(&scoring_input, &channel);

        let thumbnail_url = raw.thumbnail_url.clone();
        let video = match existing {
            Some(mut old) => {
                old.title = raw.title.clone();
                old.description = raw.description.clone();
                old.channel_title = raw.channel_title.clone();
                old.view_count = raw.view_count;
                old.like_count = raw.like_count;
                old.comment_count = raw.comment_count;
                old.duration_seconds = duration_seconds;
                old.tags = raw.tags.clone();
                old.thumbnail_url = thumbnail_url;
                old.matched_ips = matched_ips.clone();
                old.discovered_at = now;
                old
            }
            None => Video {
                video_id: raw.video_id.clone().into(),
                title: raw.title.clone(),
                description: raw.description.clone(),
                channel_id: raw.channel_id.clone(),
                channel_title: raw.channel_title.clone(),
                published_at: raw.published_at,
                view_count: raw.view_count,
                like_count: raw.like_count,
                comment_count: raw.comment_count,
                duration_seconds,
                tags: raw.tags.clone(),
                thumbnail_url,
                matched_ips: matched_ips.clone(),
                initial_risk: score,
                current_risk: score,
                risk_tier: RiskTier::from_score(score),
                view_velocity: None,
                last_risk_update: now,
                next_scan_at: now,
                processing_state: ProcessingState::Discovered,
                gemini_result: None,
                risk_history: vec![ipguard_models::RiskHistoryEntry {
                    ts: now,
                    prev_risk: 0,
                    new_risk: score,
                    factor_contributions: contributions.clone(),
                    reason: "initial_discovery".to_string(),
                }],
                discovered_at: now,
            },
        };

        self.videos.create(&video).await?;
        info!(video_id = %video.video_id, risk = video.current_risk, tier = ?video.risk_tier, "video persisted");

        if let Err(e) = self
            .bus
            .publish(
                Topic::VideoDiscovered,
                VideoDiscoveredPayload {
                    video_id: video.video_id.clone(),
                    channel_id: video.channel_id.clone(),
                    title: video.title.clone(),
                    initial_risk: video.initial_risk,
                    risk_tier: video.risk_tier,
                    matched_ips: video.matched_ips.iter().cloned().collect(),
                    discovered_at: video.discovered_at,
                },
            )
            .await
        {
            // Persist already succeeded; the analyzer's rescore pass can re-derive state
            // from `videos` rows, so a publish failure here never loses data (§4.2, §7).
            warn!(video_id = %video.video_id, error = %e, "video-discovered publish failed");
        }

        Ok(ProcessOutcome::Persisted)
    }
}

fn match_ip_targets(combined_lower: &str, catalog: &[IpTarget]) -> BTreeSet<IpTargetId> {
    catalog
        .iter()
        .filter(|target| {
            target.character_names_lower().iter().any(|name| combined_lower.contains(name.as_str()))
                || target.ai_tool_keywords_lower().iter().any(|kw| combined_lower.contains(kw.as_str()))
        })
        .map(|target| target.id.clone())
        .collect()
}

fn title_signal(title_lower: &str, catalog: &[IpTarget]) -> (bool, bool, bool) {
    let mut character = false;
    let mut ai_tool = false;
    let mut generic = false;
    for target in catalog {
        character |= target.character_names_lower().iter().any(|n| title_lower.contains(n.as_str()));
        ai_tool |= target.ai_tool_keywords_lower().iter().any(|k| title_lower.contains(k.as_str()));
        generic |= title_lower.contains(&target.name.to_lowercase());
    }
    (character, ai_tool, generic && !character)
}

fn description_signal(description_lower: &str, catalog: &[IpTarget]) -> (u32, bool) {
    let mut all_ai_keywords: Vec<String> = catalog.iter().flat_map(|t| t.ai_tool_keywords_lower()).collect();
    all_ai_keywords.sort();
    all_ai_keywords.dedup();
    let mentions = all_ai_keywords.iter().filter(|kw| description_lower.contains(kw.as_str())).count() as u32;
    let generic = description_lower.contains("ai ") || description_lower.contains("generated") || description_lower.contains("ai-generated");
    (mentions, generic)
}

fn tag_match_count(tags: &[String], catalog: &[IpTarget]) -> u32 {
    let lowered_tags: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    let mut keywords: Vec<String> = catalog
        .iter()
        .flat_map(|t| t.character_names_lower().into_iter().chain(t.ai_tool_keywords_lower()))
        .collect();
    keywords.sort();
    keywords.dedup();
    lowered_tags.iter().filter(|tag| keywords.iter().any(|k| tag.contains(k.as_str()))).count() as u32
}

/// Exposed for C4 `MarkScanned` callers: whether any video in a processed batch matched.
pub fn any_match_found(outcomes: &[ProcessOutcome]) -> bool {
    outcomes.iter().any(|o| *o == ProcessOutcome::Persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipguard_models::{Priority, ValueTier};

    fn sample_catalog() -> Vec<IpTarget> {
        vec![IpTarget {
            id: IpTargetId::from_raw("ip1"),
            name: "Sample Franchise".into(),
            owner: "Studio".into(),
            priority: Priority::High,
            value_tier: ValueTier::Aaa,
            character_names: vec!["Captain Nova".into()],
            ai_tool_keywords: vec!["sora".into()],
        }]
    }

    #[test]
    fn match_ip_targets_is_case_insensitive_substring() {
        let catalog = sample_catalog();
        let matched = match_ip_targets("a video about captain nova made with sora", &catalog);
        assert_eq!(matched.len(), 1);
        assert!(matched.contains(&IpTargetId::from_raw("ip1")));
    }

    #[test]
    fn no_match_returns_empty_set() {
        let catalog = sample_catalog();
        let matched = match_ip_targets("my dog playing in the yard", &catalog);
        assert!(matched.is_empty());
    }

    #[test]
    fn title_signal_detects_character_and_ai_tool_together() {
        let catalog = sample_catalog();
        let (character, ai_tool, generic) = title_signal("captain nova sora ai video", &catalog);
        assert!(character);
        assert!(ai_tool);
        assert!(!generic);
    }

    #[test]
    fn tag_match_count_counts_distinct_matching_tags() {
        let catalog = sample_catalog();
        let tags = vec!["captain nova".to_string(), "sora".to_string(), "unrelated".to_string()];
        assert_eq!(tag_match_count(&tags, &catalog), 2);
    }
}
