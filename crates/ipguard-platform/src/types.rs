//! Platform-native video metadata, before it becomes an `ipguard_models::Video`.

use chrono::{DateTime, Utc};
use ipguard_models::ChannelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_id: ChannelId,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// Raw ISO-8601 duration as returned by the platform (e.g. `PT4M13S`); C2's extract
    /// step is responsible for parsing this into seconds (§4.2).
    pub duration_iso8601: String,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
}
