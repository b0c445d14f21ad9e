//! The rescoring formula (§4.11, C11): pure, side-effect-free, test-friendly.
//!
//! Each contribution is a fixed-variant `ScoringFactor` rather than an open-ended set of
//! ad hoc rules, so the evaluator is total and its output is always itemizable.

use chrono::{DateTime, Utc};
use ipguard_models::{ChannelProfile, GeminiResult, RiskTier, Video};
use serde::{Deserialize, Serialize};

use crate::velocity::VelocityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringFactor {
    Velocity,
    ChannelSerial,
    ChannelFrequent,
    ChannelSome,
    ChannelCleanAndConfident,
    EngagementHigh,
    EngagementMedium,
    EngagementLow,
    AgeOver90Days,
    AgeOver30Days,
    AgeOver7Days,
    PriorConfirmedInfringement,
    PriorAnalyzedClean,
}

impl ScoringFactor {
    pub fn label(self) -> &'static str {
        match self {
            ScoringFactor::Velocity => "velocity",
            ScoringFactor::ChannelSerial => "channel_serial",
            ScoringFactor::ChannelFrequent => "channel_frequent",
            ScoringFactor::ChannelSome => "channel_some",
            ScoringFactor::ChannelCleanAndConfident => "channel_clean_and_confident",
            ScoringFactor::EngagementHigh => "engagement_high",
            ScoringFactor::EngagementMedium => "engagement_medium",
            ScoringFactor::EngagementLow => "engagement_low",
            ScoringFactor::AgeOver90Days => "age_over_90d",
            ScoringFactor::AgeOver30Days => "age_over_30d",
            ScoringFactor::AgeOver7Days => "age_over_7d",
            ScoringFactor::PriorConfirmedInfringement => "prior_confirmed_infringement",
            ScoringFactor::PriorAnalyzedClean => "prior_analyzed_clean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub previous_risk: u8,
    pub new_risk: u8,
    pub tier: RiskTier,
    pub factor_contributions: Vec<(String, i32)>,
}

fn channel_factor(channel: &ChannelProfile) -> Option<(ScoringFactor, i32)> {
    let rate = channel.infringement_rate();
    let scanned = channel.total_videos_scanned;
    if rate > 0.50 && scanned >= 5 {
        Some((ScoringFactor::ChannelSerial, 20))
    } else if rate > 0.25 && scanned >= 5 {
        Some((ScoringFactor::ChannelFrequent, 15))
    } else if rate > 0.10 {
        Some((ScoringFactor::ChannelSome, 10))
    } else if rate < 0.05 && scanned >= 20 {
        Some((ScoringFactor::ChannelCleanAndConfident, -10))
    } else {
        None
    }
}

fn engagement_factor(video: &Video) -> Option<(ScoringFactor, i32)> {
    let rate = video.like_count as f64 / video.view_count.max(1) as f64;
    if rate >= 0.10 {
        Some((ScoringFactor::EngagementHigh, 10))
    } else if rate >= 0.05 {
        Some((ScoringFactor::EngagementMedium, 5))
    } else if rate >= 0.02 {
        Some((ScoringFactor::EngagementLow, 3))
    } else {
        None
    }
}

fn age_factor(video: &Video, now: DateTime<Utc>) -> Option<(ScoringFactor, i32)> {
    let age = now - video.published_at;
    if age > chrono::Duration::days(90) {
        Some((ScoringFactor::AgeOver90Days, -15))
    } else if age > chrono::Duration::days(30) {
        Some((ScoringFactor::AgeOver30Days, -10))
    } else if age > chrono::Duration::days(7) {
        Some((ScoringFactor::AgeOver7Days, -5))
    } else {
        None
    }
}

fn prior_analysis_factor(prior: Option<&GeminiResult>) -> Option<(ScoringFactor, i32)> {
    match prior {
        Some(result) if result.contains_infringement => Some((ScoringFactor::PriorConfirmedInfringement, 20)),
        Some(_) => Some((ScoringFactor::PriorAnalyzedClean, -10)),
        None => None,
    }
}

/// Re-scores `video` against its current state, clamping the result to `[0, 100]`.
pub fn rescore(
    video: &Video,
    channel: &ChannelProfile,
    velocity: VelocityResult,
    prior: Option<&GeminiResult>,
    now: DateTime<Utc>,
) -> ScoringOutcome {
    let mut total = video.current_risk as i32;
    let mut contributions = Vec::new();

    if velocity.boost != 0 {
        contributions.push((ScoringFactor::Velocity, velocity.boost));
        total += velocity.boost;
    }
    for factor in [
        channel_factor(channel),
        engagement_factor(video),
        age_factor(video, now),
        prior_analysis_factor(prior),
    ]
    .into_iter()
    .flatten()
    {
        contributions.push(factor);
        total += factor.1;
    }

    let clamped = total.clamp(0, 100) as u8;
    ScoringOutcome {
        previous_risk: video.current_risk,
        new_risk: clamped,
        tier: RiskTier::from_score(clamped),
        factor_contributions: contributions.into_iter().map(|(f, pts)| (f.label().to_string(), pts)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipguard_models::{ChannelId, IpTargetId, ProcessingState, VideoId};
    use std::collections::BTreeSet;

    fn sample_video(current_risk: u8, view_count: u64, like_count: u64, published_at: DateTime<Utc>) -> Video {
        Video {
            video_id: VideoId::from_raw("v1"),
            title: "t".into(),
            description: "d".into(),
            channel_id: ChannelId::from_raw("c1"),
            channel_title: "chan".into(),
            published_at,
            view_count,
            like_count,
            comment_count: 0,
            duration_seconds: 60,
            tags: vec![],
            thumbnail_url: None,
            matched_ips: BTreeSet::from([IpTargetId::from_raw("ip1")]),
            initial_risk: current_risk,
            current_risk,
            risk_tier: RiskTier::from_score(current_risk),
            view_velocity: None,
            last_risk_update: Utc::now(),
            next_scan_at: Utc::now(),
            processing_state: ProcessingState::Discovered,
            gemini_result: None,
            risk_history: vec![],
            discovered_at: Utc::now(),
        }
    }

    fn sample_channel(rate_numerator: u32, scanned: u32) -> ChannelProfile {
        let mut profile = ChannelProfile::new(ChannelId::from_raw("c1"), "chan".into(), Utc::now());
        profile.total_videos_scanned = scanned;
        profile.confirmed_infringements = rate_numerator;
        profile
    }

    fn no_velocity() -> VelocityResult {
        VelocityResult {
            views_per_hour: 0.0,
            tier: crate::velocity::VelocityTier::Unknown,
            boost: 0,
        }
    }

    #[test]
    fn scenario_velocity_promotion_crosses_to_critical() {
        let video = sample_video(60, 1000, 0, Utc::now());
        let channel = sample_channel(0, 0);
        let velocity = VelocityResult {
            views_per_hour: 14_000.0,
            tier: crate::velocity::VelocityTier::Explosive,
            boost: 30,
        };
        let outcome = rescore(&video, &channel, velocity, None, Utc::now());
        assert_eq!(outcome.new_risk, 90);
        assert_eq!(outcome.tier, RiskTier::Critical);
        assert_eq!(outcome.factor_contributions, vec![("velocity".to_string(), 30)]);
    }

    #[test]
    fn result_is_clamped_to_valid_range() {
        let video = sample_video(95, 10, 0, Utc::now() - chrono::Duration::days(100));
        let channel = sample_channel(0, 0);
        let prior = GeminiResult {
            contains_infringement: true,
            confidence: 0.9,
            characters_detected: vec![],
            analyzed_at: Utc::now(),
        };
        let velocity = VelocityResult {
            views_per_hour: 20_000.0,
            tier: crate::velocity::VelocityTier::Explosive,
            boost: 30,
        };
        let outcome = rescore(&video, &channel, velocity, Some(&prior), Utc::now());
        assert_eq!(outcome.new_risk, 100, "95 + 30 + 20 - 15 must clamp to 100");
    }

    #[test]
    fn clean_confident_channel_and_old_video_pull_score_down() {
        let video = sample_video(50, 1000, 0, Utc::now() - chrono::Duration::days(95));
        let channel = sample_channel(0, 25);
        let outcome = rescore(&video, &channel, no_velocity(), None, Utc::now());
        // 50 - 10 (clean-and-confident) - 15 (age > 90d) = 25.
        assert_eq!(outcome.new_risk, 25);
        assert!(outcome.factor_contributions.contains(&("channel_clean_and_confident".to_string(), -10)));
        assert!(outcome.factor_contributions.contains(&("age_over_90d".to_string(), -15)));
    }

    #[test]
    fn high_engagement_and_serial_channel_stack_additively() {
        let video = sample_video(40, 1000, 150, Utc::now());
        let channel = sample_channel(6, 10);
        let outcome = rescore(&video, &channel, no_velocity(), None, Utc::now());
        // 40 + 20 (serial, rate=0.6) + 10 (engagement 0.15) = 70.
        assert_eq!(outcome.new_risk, 70);
        assert_eq!(outcome.tier, RiskTier::High);
    }
}
