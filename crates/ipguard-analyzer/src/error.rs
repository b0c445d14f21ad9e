//! Error taxonomy for the risk analyzer (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("rescan budget exceeded")]
    BudgetExceeded,

    #[error("transient platform error: {0}")]
    TransientPlatform(#[from] ipguard_platform::PlatformError),

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] ipguard_store::StoreError),

    #[error("bus error: {0}")]
    Bus(#[from] ipguard_bus::BusError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Per §7: only config errors are fatal at startup; everything else is a per-message or
    /// per-tick failure the caller logs and moves on from.
    pub fn is_fatal_to_cycle(&self) -> bool {
        matches!(self, AnalyzerError::Config(_))
    }
}
