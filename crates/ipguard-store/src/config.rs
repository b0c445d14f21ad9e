//! Firestore connection settings, loaded from the environment (§6 configuration surface).

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub gcp_project_id: String,
    pub firestore_database_id: String,
    pub platform_daily_quota_units: u32,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        let gcp_project_id = std::env::var("GCP_PROJECT_ID")
            .map_err(|_| StoreError::UnexpectedResponse("GCP_PROJECT_ID is not set".into()))?;
        let firestore_database_id = std::env::var("FIRESTORE_DATABASE_ID").unwrap_or_else(|_| "(default)".to_string());
        let platform_daily_quota_units = std::env::var("PLATFORM_DAILY_QUOTA_UNITS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        Ok(Self {
            gcp_project_id,
            firestore_database_id,
            platform_daily_quota_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_apply_when_optional_vars_are_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("GCP_PROJECT_ID", "ipguard-test");
        std::env::remove_var("FIRESTORE_DATABASE_ID");
        std::env::remove_var("PLATFORM_DAILY_QUOTA_UNITS");

        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.gcp_project_id, "ipguard-test");
        assert_eq!(config.firestore_database_id, "(default)");
        assert_eq!(config.platform_daily_quota_units, 10_000);
    }
}
