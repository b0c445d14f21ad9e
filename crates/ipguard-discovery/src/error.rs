//! Error taxonomy for the discovery pipeline (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("daily quota budget exceeded")]
    BudgetExceeded,

    #[error("transient platform error: {0}")]
    TransientPlatform(#[from] ipguard_platform::PlatformError),

    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("duplicate video, updated in place: {0}")]
    Duplicate(String),

    #[error("store error: {0}")]
    Store(#[from] ipguard_store::StoreError),

    #[error("bus error: {0}")]
    Bus(#[from] ipguard_bus::BusError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DiscoveryError {
    /// Per §7: budget/config errors are structural, everything else is worth a retry
    /// somewhere up the call chain (the per-call timeout + backoff already live inside
    /// the store/bus/platform clients themselves).
    pub fn is_fatal_to_cycle(&self) -> bool {
        matches!(self, DiscoveryError::Config(_))
    }
}
