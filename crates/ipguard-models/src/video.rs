//! The `Video` entity and its supporting types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, IpTargetId, VideoId};

/// Bounded retention for a video's risk history log (§9 "ambient mutable dictionaries").
pub const RISK_HISTORY_MAX_ENTRIES: usize = 100;

/// Coarse risk classification, a total function of `current_risk` (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Map a clamped `0..=100` score to its tier. Total function per §4.9.
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=100 => RiskTier::Critical,
            70..=89 => RiskTier::High,
            40..=69 => RiskTier::Medium,
            20..=39 => RiskTier::Low,
            _ => RiskTier::VeryLow,
        }
    }

    /// Rescan interval for this tier, per the §4.12 scan-interval table.
    pub fn rescan_interval(self) -> chrono::Duration {
        match self {
            RiskTier::Critical => chrono::Duration::hours(6),
            RiskTier::High => chrono::Duration::hours(24),
            RiskTier::Medium => chrono::Duration::days(3),
            RiskTier::Low => chrono::Duration::days(7),
            RiskTier::VeryLow => chrono::Duration::days(30),
        }
    }
}

/// Lifecycle state of a video's downstream analysis. §4.12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Discovered,
    Queued,
    Processing,
    Analyzed,
    Failed,
}

/// Result of the downstream vision analyzer, attached by the `vision-feedback` handler.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeminiResult {
    pub contains_infringement: bool,
    pub confidence: f64,
    pub characters_detected: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// One entry in a video's append-only risk history log.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RiskHistoryEntry {
    pub ts: DateTime<Utc>,
    pub prev_risk: u8,
    pub new_risk: u8,
    pub factor_contributions: Vec<(String, i32)>,
    pub reason: String,
}

/// A discovered, possibly-infringing video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    pub video_id: VideoId,
    pub title: String,
    pub description: String,
    pub channel_id: ChannelId,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub duration_seconds: u32,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub matched_ips: BTreeSet<IpTargetId>,
    /// Set exactly once, at first persist. Invariant #2 in §3.
    pub initial_risk: u8,
    pub current_risk: u8,
    pub risk_tier: RiskTier,
    pub view_velocity: Option<f64>,
    pub last_risk_update: DateTime<Utc>,
    pub next_scan_at: DateTime<Utc>,
    pub processing_state: ProcessingState,
    pub gemini_result: Option<GeminiResult>,
    pub risk_history: Vec<RiskHistoryEntry>,
    pub discovered_at: DateTime<Utc>,
}

impl Video {
    /// Append a risk history entry, trimming to `RISK_HISTORY_MAX_ENTRIES` from the front.
    pub fn push_risk_history(&mut self, entry: RiskHistoryEntry) {
        self.risk_history.push(entry);
        if self.risk_history.len() > RISK_HISTORY_MAX_ENTRIES {
            let overflow = self.risk_history.len() - RISK_HISTORY_MAX_ENTRIES;
            self.risk_history.drain(0..overflow);
        }
    }

    /// Whether this video has ever received a non-failed analysis verdict.
    pub fn has_clean_analysis_history(&self) -> bool {
        self.gemini_result.is_some() && self.processing_state != ProcessingState::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mapping_is_total_and_matches_boundaries() {
        assert_eq!(RiskTier::from_score(0), RiskTier::VeryLow);
        assert_eq!(RiskTier::from_score(19), RiskTier::VeryLow);
        assert_eq!(RiskTier::from_score(20), RiskTier::Low);
        assert_eq!(RiskTier::from_score(39), RiskTier::Low);
        assert_eq!(RiskTier::from_score(40), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(69), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(70), RiskTier::High);
        assert_eq!(RiskTier::from_score(89), RiskTier::High);
        assert_eq!(RiskTier::from_score(90), RiskTier::Critical);
        assert_eq!(RiskTier::from_score(100), RiskTier::Critical);
    }

    #[test]
    fn risk_history_is_bounded() {
        let mut video = sample_video();
        for i in 0..(RISK_HISTORY_MAX_ENTRIES + 10) {
            video.push_risk_history(RiskHistoryEntry {
                ts: Utc::now(),
                prev_risk: 0,
                new_risk: i as u8,
                factor_contributions: vec![],
                reason: "test".into(),
            });
        }
        assert_eq!(video.risk_history.len(), RISK_HISTORY_MAX_ENTRIES);
        // Oldest entries were trimmed, newest retained.
        assert_eq!(video.risk_history.last().unwrap().new_risk, (RISK_HISTORY_MAX_ENTRIES + 9) as u8);
    }

    fn sample_video() -> Video {
        Video {
            video_id: VideoId::from_raw("v1"),
            title: "t".into(),
            description: "d".into(),
            channel_id: ChannelId::from_raw("c1"),
            channel_title: "chan".into(),
            published_at: Utc::now(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            duration_seconds: 0,
            tags: vec![],
            thumbnail_url: None,
            matched_ips: BTreeSet::new(),
            initial_risk: 0,
            current_risk: 0,
            risk_tier: RiskTier::VeryLow,
            view_velocity: None,
            last_risk_update: Utc::now(),
            next_scan_at: Utc::now(),
            processing_state: ProcessingState::Discovered,
            gemini_result: None,
            risk_history: vec![],
            discovered_at: Utc::now(),
        }
    }
}
