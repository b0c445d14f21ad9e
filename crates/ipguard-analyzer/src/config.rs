//! Risk analyzer configuration, loaded from the environment (§6).

use std::time::Duration;

use crate::error::AnalyzerError;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub rescore_interval: Duration,
    pub rescan_quota: u32,
    pub rescan_batch_size: i32,
    pub high_risk_threshold: u8,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rescore_interval: Duration::from_secs(15 * 60),
            rescan_quota: 2_000,
            rescan_batch_size: 100,
            high_risk_threshold: 70,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self, AnalyzerError> {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("RESCORE_INTERVAL_SECONDS") {
            let secs: u64 = v.parse().map_err(|_| AnalyzerError::Config("RESCORE_INTERVAL_SECONDS must be an integer".into()))?;
            config.rescore_interval = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("RESCAN_QUOTA") {
            config.rescan_quota = v.parse().map_err(|_| AnalyzerError::Config("RESCAN_QUOTA must be an integer".into()))?;
        }
        if let Ok(v) = std::env::var("RESCAN_BATCH_SIZE") {
            config.rescan_batch_size = v.parse().map_err(|_| AnalyzerError::Config("RESCAN_BATCH_SIZE must be an integer".into()))?;
        }
        if let Ok(v) = std::env::var("HIGH_RISK_THRESHOLD") {
            config.high_risk_threshold = v.parse().map_err(|_| AnalyzerError::Config("HIGH_RISK_THRESHOLD must be an integer".into()))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.rescan_quota, 2_000);
        assert_eq!(config.high_risk_threshold, 70);
        assert_eq!(config.rescore_interval, Duration::from_secs(900));
    }
}
