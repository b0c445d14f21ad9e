//! The video platform boundary (§6). Only the shape of the integration is specified; no
//! concrete platform API binding is part of this system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ipguard_models::ChannelId;

use crate::error::PlatformError;
use crate::types::RawVideo;

/// Everything the discovery pipeline needs from the underlying video platform. Each method
/// corresponds to exactly one billable operation in the quota-cost table (§4.1); callers are
/// responsible for charging the ledger before or after the call per their own retry policy.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Full-text keyword search, scoped to videos published after `published_after`.
    async fn search_videos(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<RawVideo>, PlatformError>;

    /// Platform-wide trending videos for `region`.
    async fn get_trending(&self, region: &str, max_results: u32) -> Result<Vec<RawVideo>, PlatformError>;

    /// A channel's uploads published after `published_after`.
    async fn get_channel_uploads(
        &self,
        channel_id: &ChannelId,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<RawVideo>, PlatformError>;

    /// Batched metadata refresh (view/like/comment counts) for already-known videos.
    async fn get_video_details(&self, video_ids: &[String]) -> Result<Vec<RawVideo>, PlatformError>;
}
