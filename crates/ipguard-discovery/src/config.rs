//! Discovery pipeline configuration, loaded from the environment (§6).

use std::time::Duration;

use crate::error::DiscoveryError;

#[derive(Debug, Clone)]
pub struct TierAllocations {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
}

impl Default for TierAllocations {
    fn default() -> Self {
        Self {
            tier1: 0.20,
            tier2: 0.60,
            tier3: 0.20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub daily_quota: u32,
    pub max_per_cycle: u32,
    pub discovery_interval: Duration,
    pub cycle_deadline: Duration,
    pub tier_allocations: TierAllocations,
    pub dedupe_window_days: i64,
    pub skip_no_ip_match: bool,
    pub trending_categories: Vec<String>,
    pub ip_catalog_path: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            daily_quota: 10_000,
            max_per_cycle: 10_000,
            discovery_interval: Duration::from_secs(3600),
            cycle_deadline: Duration::from_secs(600),
            tier_allocations: TierAllocations::default(),
            dedupe_window_days: 7,
            skip_no_ip_match: true,
            trending_categories: vec![],
            ip_catalog_path: "ip_catalog.json".to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self, DiscoveryError> {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("DAILY_QUOTA") {
            config.daily_quota = v.parse().map_err(|_| DiscoveryError::Config("DAILY_QUOTA must be an integer".into()))?;
        }
        if let Ok(v) = std::env::var("MAX_PER_CYCLE") {
            config.max_per_cycle = v.parse().map_err(|_| DiscoveryError::Config("MAX_PER_CYCLE must be an integer".into()))?;
        }
        if let Ok(v) = std::env::var("DISCOVERY_INTERVAL_SECONDS") {
            let secs: u64 = v.parse().map_err(|_| DiscoveryError::Config("DISCOVERY_INTERVAL_SECONDS must be an integer".into()))?;
            config.discovery_interval = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("DEDUPE_WINDOW_DAYS") {
            config.dedupe_window_days = v.parse().map_err(|_| DiscoveryError::Config("DEDUPE_WINDOW_DAYS must be an integer".into()))?;
        }
        if let Ok(v) = std::env::var("SKIP_NO_IP_MATCH") {
            config.skip_no_ip_match = v.parse().unwrap_or(true);
        }
        if let Ok(v) = std::env::var("TRENDING_CATEGORIES") {
            config.trending_categories = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = std::env::var("IP_CATALOG_PATH") {
            config.ip_catalog_path = v;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tier_allocations_sum_to_one() {
        let t = TierAllocations::default();
        assert!((t.tier1 + t.tier2 + t.tier3 - 1.0).abs() < 1e-9);
    }
}
