//! Platform API quota accounting (§4.1, C1).

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A billable platform API call. Costs mirror the real quota unit table (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuotaOperation {
    Search,
    VideoDetails,
    Trending,
    ChannelDetails,
    ChannelUploads,
}

impl QuotaOperation {
    /// Unit cost, per §4.1.
    pub fn cost(self) -> u32 {
        match self {
            QuotaOperation::Search => 100,
            QuotaOperation::VideoDetails => 1,
            QuotaOperation::Trending => 1,
            QuotaOperation::ChannelDetails => 3,
            QuotaOperation::ChannelUploads => 3,
        }
    }
}

/// Daily quota usage ledger, keyed by UTC calendar day (§4.1 "resets at UTC midnight").
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuotaUsage {
    pub day: NaiveDate,
    pub daily_limit: u32,
    pub units_consumed: u32,
}

impl QuotaUsage {
    pub fn new_for_day(day: NaiveDate, daily_limit: u32) -> Self {
        Self {
            day,
            daily_limit,
            units_consumed: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.units_consumed)
    }

    pub fn utilization(&self) -> f64 {
        if self.daily_limit == 0 {
            1.0
        } else {
            self.units_consumed as f64 / self.daily_limit as f64
        }
    }

    pub fn can_afford(&self, op: QuotaOperation) -> bool {
        self.remaining() >= op.cost()
    }

    /// Deduct the operation's cost. Caller (the store layer) is responsible for the
    /// optimistic-concurrency retry loop around this; this method only applies the math
    /// and never goes negative. Returns `false` (without mutating) on insufficient quota.
    pub fn charge(&mut self, op: QuotaOperation) -> bool {
        if !self.can_afford(op) {
            return false;
        }
        self.units_consumed += op.cost();
        true
    }

    pub fn day_bucket(now: DateTime<Utc>) -> NaiveDate {
        now.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_rejects_when_insufficient() {
        let mut usage = QuotaUsage::new_for_day(Utc::now().date_naive(), 150);
        assert!(usage.charge(QuotaOperation::Search));
        assert_eq!(usage.units_consumed, 100);
        assert!(!usage.charge(QuotaOperation::Search));
        assert_eq!(usage.units_consumed, 100, "rejected charge must not mutate state");
    }

    #[test]
    fn utilization_tracks_fraction_consumed() {
        let mut usage = QuotaUsage::new_for_day(Utc::now().date_naive(), 200);
        usage.charge(QuotaOperation::ChannelDetails);
        assert!((usage.utilization() - 0.015).abs() < 1e-9);
    }
}
