//! The `ChannelProfile` entity.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::ChannelId;

/// Coarse classification driving channel rescan cadence (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelTier {
    Platinum,
    Gold,
    Silver,
    Bronze,
    Ignore,
}

impl ChannelTier {
    /// Rescan interval, `None` means never (`IGNORE`).
    pub fn rescan_interval(self) -> Option<chrono::Duration> {
        match self {
            ChannelTier::Platinum => Some(chrono::Duration::hours(24)),
            ChannelTier::Gold => Some(chrono::Duration::hours(72)),
            ChannelTier::Silver => Some(chrono::Duration::days(7)),
            ChannelTier::Bronze => Some(chrono::Duration::days(30)),
            ChannelTier::Ignore => None,
        }
    }

    /// Ordering key for `DueForScan`: PLATINUM first.
    pub fn rank(self) -> u8 {
        match self {
            ChannelTier::Platinum => 0,
            ChannelTier::Gold => 1,
            ChannelTier::Silver => 2,
            ChannelTier::Bronze => 3,
            ChannelTier::Ignore => 4,
        }
    }

    /// Recompute the tier from `(rate, scanned, confirmed)` per the §4.4 table.
    ///
    /// Order matters: PLATINUM/GOLD/SILVER are rate-driven and checked first, then
    /// BRONZE/IGNORE apply to channels with too little signal to have risen above them.
    pub fn classify(rate: f64, scanned: u32, confirmed: u32) -> Self {
        if rate > 0.50 && confirmed > 10 {
            ChannelTier::Platinum
        } else if rate > 0.25 && confirmed > 5 {
            ChannelTier::Gold
        } else if rate > 0.10 {
            ChannelTier::Silver
        } else if scanned >= 20 && confirmed == 0 {
            ChannelTier::Ignore
        } else if scanned >= 5 {
            ChannelTier::Bronze
        } else {
            ChannelTier::Silver
        }
    }
}

/// Per-channel profile and scan cadence state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChannelProfile {
    pub channel_id: ChannelId,
    pub channel_title: String,
    pub tier: ChannelTier,
    pub total_videos_scanned: u32,
    pub confirmed_infringements: u32,
    pub videos_cleared: u32,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub next_scan_at: DateTime<Utc>,
    pub subscriber_count: Option<u64>,
    pub discovered_at: DateTime<Utc>,
}

impl ChannelProfile {
    /// A brand-new profile, defaulting to SILVER with empty counters (§4.4).
    pub fn new(channel_id: ChannelId, channel_title: String, now: DateTime<Utc>) -> Self {
        Self {
            channel_id,
            channel_title,
            tier: ChannelTier::Silver,
            total_videos_scanned: 0,
            confirmed_infringements: 0,
            videos_cleared: 0,
            last_scanned_at: None,
            next_scan_at: now,
            subscriber_count: None,
            discovered_at: now,
        }
    }

    /// `confirmed_infringements / total_videos_scanned`, `0.0` for a channel never scanned.
    /// Invariant #6 in §3: never stored independently of the two counters.
    pub fn infringement_rate(&self) -> f64 {
        if self.total_videos_scanned == 0 {
            0.0
        } else {
            self.confirmed_infringements as f64 / self.total_videos_scanned as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_scenario_5_promotion() {
        // scanned=10, confirmed=5 -> rate=0.50, not > 0.50, stays SILVER.
        assert_eq!(ChannelTier::classify(0.50, 10, 5), ChannelTier::Silver);
        // scanned=11, confirmed=6 -> rate~0.545 and confirmed>5 -> GOLD.
        assert_eq!(ChannelTier::classify(6.0 / 11.0, 11, 6), ChannelTier::Gold);
    }

    #[test]
    fn classify_ignore_requires_zero_confirmed_and_enough_scans() {
        assert_eq!(ChannelTier::classify(0.0, 20, 0), ChannelTier::Ignore);
        assert_eq!(ChannelTier::classify(0.0, 19, 0), ChannelTier::Bronze);
    }

    #[test]
    fn infringement_rate_is_derived_not_stored() {
        let mut profile = ChannelProfile::new(ChannelId::from_raw("c"), "c".into(), Utc::now());
        assert_eq!(profile.infringement_rate(), 0.0);
        profile.total_videos_scanned = 4;
        profile.confirmed_infringements = 1;
        assert_eq!(profile.infringement_rate(), 0.25);
    }
}
