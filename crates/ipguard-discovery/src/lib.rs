//! Discovery pipeline: quota-aware three-tier video discovery (§4).

pub mod budget;
pub mod channel_registry;
pub mod config;
pub mod duration;
pub mod error;
pub mod ip_catalog;
pub mod keyword_registry;
pub mod orchestrator;
pub mod processor;
pub mod report;
pub mod scanners;

pub use budget::TierBudget;
pub use channel_registry::ChannelRegistry;
pub use config::{DiscoveryConfig, TierAllocations};
pub use error::DiscoveryError;
pub use keyword_registry::KeywordRegistry;
pub use orchestrator::{run_cycle, CycleContext};
pub use processor::{ProcessOutcome, VideoProcessor};
pub use report::{CycleReport, TierReport};
