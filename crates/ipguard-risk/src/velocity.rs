//! View velocity classification from a window of `ViewSnapshot`s (§4.10, C10).

use chrono::{DateTime, Utc};
use ipguard_models::ViewSnapshot;
use serde::{Deserialize, Serialize};

pub const LOOKBACK: chrono::Duration = chrono::Duration::hours(24);
const MIN_SPAN: chrono::Duration = chrono::Duration::minutes(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityTier {
    Unknown,
    InsufficientData,
    Stable,
    Growing,
    Trending,
    Viral,
    Explosive,
}

impl VelocityTier {
    fn from_vph(vph: f64) -> (Self, i32) {
        if vph >= 10_000.0 {
            (VelocityTier::Explosive, 30)
        } else if vph >= 1_000.0 {
            (VelocityTier::Viral, 20)
        } else if vph >= 100.0 {
            (VelocityTier::Trending, 10)
        } else if vph >= 10.0 {
            (VelocityTier::Growing, 5)
        } else {
            (VelocityTier::Stable, 0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityResult {
    pub views_per_hour: f64,
    pub tier: VelocityTier,
    pub boost: i32,
}

impl VelocityResult {
    fn unknown() -> Self {
        Self {
            views_per_hour: 0.0,
            tier: VelocityTier::Unknown,
            boost: 0,
        }
    }

    fn insufficient_data() -> Self {
        Self {
            views_per_hour: 0.0,
            tier: VelocityTier::InsufficientData,
            boost: 0,
        }
    }
}

/// Computes view velocity over `snapshots` restricted to `lookback` before `now`.
/// `snapshots` need not be pre-filtered or sorted; both are done here.
pub fn velocity(now: DateTime<Utc>, current_views: u64, snapshots: &[ViewSnapshot]) -> VelocityResult {
    let mut window: Vec<&ViewSnapshot> = snapshots
        .iter()
        .filter(|s| now - s.sampled_at <= LOOKBACK)
        .collect();
    window.sort_by_key(|s| s.sampled_at);

    let Some(oldest) = window.first() else {
        return VelocityResult::unknown();
    };

    let span = now - oldest.sampled_at;
    if span < MIN_SPAN {
        return VelocityResult::insufficient_data();
    }

    // A decreasing count (deletion, platform correction) is clamped rather than treated
    // as negative velocity.
    let delta = current_views.saturating_sub(oldest.view_count);
    let span_hours = span.num_milliseconds() as f64 / 3_600_000.0;
    let vph = delta as f64 / span_hours;

    let (tier, boost) = VelocityTier::from_vph(vph);
    VelocityResult {
        views_per_hour: vph,
        tier,
        boost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipguard_models::VideoId;

    fn snapshot(views: u64, sampled_at: DateTime<Utc>) -> ViewSnapshot {
        ViewSnapshot::new(VideoId::from_raw("v"), views, sampled_at)
    }

    #[test]
    fn no_snapshots_is_unknown() {
        let result = velocity(Utc::now(), 100, &[]);
        assert_eq!(result.tier, VelocityTier::Unknown);
        assert_eq!(result.boost, 0);
    }

    #[test]
    fn span_under_six_minutes_is_insufficient_data() {
        let now = Utc::now();
        let snapshots = vec![snapshot(100, now - chrono::Duration::minutes(3))];
        let result = velocity(now, 200, &snapshots);
        assert_eq!(result.tier, VelocityTier::InsufficientData);
    }

    #[test]
    fn scenario_explosive_promotion() {
        // t=0 views=1000, t=now=1h views=15000 -> vph=14000 -> EXPLOSIVE -> +30.
        let now = Utc::now();
        let snapshots = vec![snapshot(1_000, now - chrono::Duration::hours(1))];
        let result = velocity(now, 15_000, &snapshots);
        assert_eq!(result.tier, VelocityTier::Explosive);
        assert_eq!(result.boost, 30);
        assert!((result.views_per_hour - 14_000.0).abs() < 1.0);
    }

    #[test]
    fn decreasing_view_count_clamps_to_zero_delta() {
        let now = Utc::now();
        let snapshots = vec![snapshot(5_000, now - chrono::Duration::hours(2))];
        let result = velocity(now, 4_000, &snapshots);
        assert_eq!(result.views_per_hour, 0.0);
        assert_eq!(result.tier, VelocityTier::Stable);
    }

    #[test]
    fn boundary_tiers_match_table() {
        let now = Utc::now();
        let one_hour_ago = now - chrono::Duration::hours(1);
        assert_eq!(velocity(now, 10, &[snapshot(0, one_hour_ago)]).tier, VelocityTier::Growing);
        assert_eq!(velocity(now, 100, &[snapshot(0, one_hour_ago)]).tier, VelocityTier::Trending);
        assert_eq!(velocity(now, 1_000, &[snapshot(0, one_hour_ago)]).tier, VelocityTier::Viral);
        assert_eq!(velocity(now, 9, &[snapshot(0, one_hour_ago)]).tier, VelocityTier::Stable);
    }
}
