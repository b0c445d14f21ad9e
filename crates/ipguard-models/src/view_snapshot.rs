//! Append-only view-count samples, used to derive view velocity (§3, §4.10).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::VideoId;

/// Snapshots older than this are no longer useful to the velocity tracker and may be
/// garbage-collected by the store layer (§3 retention note).
pub const VIEW_SNAPSHOT_RETENTION: chrono::Duration = chrono::Duration::days(30);

/// One point-in-time view-count sample for a video. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewSnapshot {
    pub video_id: VideoId,
    pub view_count: u64,
    pub sampled_at: DateTime<Utc>,
}

impl ViewSnapshot {
    pub fn new(video_id: VideoId, view_count: u64, sampled_at: DateTime<Utc>) -> Self {
        Self {
            video_id,
            view_count,
            sampled_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.sampled_at > VIEW_SNAPSHOT_RETENTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_retention_window() {
        let now = Utc::now();
        let fresh = ViewSnapshot::new(VideoId::from_raw("v"), 100, now - chrono::Duration::days(1));
        let stale = ViewSnapshot::new(VideoId::from_raw("v"), 100, now - chrono::Duration::days(31));
        assert!(!fresh.is_expired(now));
        assert!(stale.is_expired(now));
    }
}
