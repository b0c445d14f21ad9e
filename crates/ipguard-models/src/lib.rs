//! Shared data model for the discovery and risk-analysis services: entities,
//! identifiers, and the pure classification tables they share.

pub mod channel;
pub mod ids;
pub mod ip_target;
pub mod keyword;
pub mod quota;
pub mod video;
pub mod view_snapshot;

pub use channel::{ChannelProfile, ChannelTier};
pub use ids::{ChannelId, IpTargetId, VideoId};
pub use ip_target::{IpTarget, Priority, ValueTier};
pub use keyword::KeywordStat;
pub use quota::{QuotaOperation, QuotaUsage};
pub use video::{GeminiResult, ProcessingState, RiskHistoryEntry, RiskTier, Video};
pub use view_snapshot::ViewSnapshot;
