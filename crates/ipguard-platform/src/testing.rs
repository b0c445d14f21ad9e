//! An in-memory `PlatformClient` fixture for exercising the discovery pipeline without a
//! real platform integration.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ipguard_models::ChannelId;

use crate::client::PlatformClient;
use crate::error::PlatformError;
use crate::types::RawVideo;

#[derive(Default)]
pub struct InMemoryPlatformClient {
    videos: Mutex<Vec<RawVideo>>,
}

impl InMemoryPlatformClient {
    pub fn new(videos: Vec<RawVideo>) -> Self {
        Self {
            videos: Mutex::new(videos),
        }
    }

    pub fn seed(&self, video: RawVideo) {
        self.videos.lock().unwrap().push(video);
    }
}

#[async_trait]
impl PlatformClient for InMemoryPlatformClient {
    async fn search_videos(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<RawVideo>, PlatformError> {
        let query_lower = query.to_lowercase();
        let matches = self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.published_at >= published_after)
            .filter(|v| v.title.to_lowercase().contains(&query_lower) || v.description.to_lowercase().contains(&query_lower))
            .take(max_results as usize)
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_trending(&self, _region: &str, max_results: u32) -> Result<Vec<RawVideo>, PlatformError> {
        let mut all = self.videos.lock().unwrap().clone();
        all.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        all.truncate(max_results as usize);
        Ok(all)
    }

    async fn get_channel_uploads(
        &self,
        channel_id: &ChannelId,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<RawVideo>, PlatformError> {
        let matches = self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|v| &v.channel_id == channel_id && v.published_at >= published_after)
            .take(max_results as usize)
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_video_details(&self, video_ids: &[String]) -> Result<Vec<RawVideo>, PlatformError> {
        let videos = self.videos.lock().unwrap();
        Ok(video_ids
            .iter()
            .filter_map(|id| videos.iter().find(|v| &v.video_id == id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, channel: &str, views: u64, published_at: DateTime<Utc>) -> RawVideo {
        RawVideo {
            video_id: id.into(),
            title: format!("title {id}"),
            description: "an ai generated clip".into(),
            channel_id: ChannelId::from_raw(channel),
            channel_title: "chan".into(),
            published_at,
            view_count: views,
            like_count: 0,
            comment_count: 0,
            duration_iso8601: "PT1M".to_string(),
            tags: vec![],
            thumbnail_url: None,
        }
    }

    #[tokio::test]
    async fn search_filters_by_query_and_recency() {
        let now = Utc::now();
        let fixture = InMemoryPlatformClient::new(vec![
            video("v1", "c1", 10, now),
            video("v2", "c1", 10, now - chrono::Duration::days(10)),
        ]);
        let results = fixture.search_videos("ai generated", now - chrono::Duration::days(1), 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "v1");
    }

    #[tokio::test]
    async fn trending_sorts_by_view_count_descending() {
        let now = Utc::now();
        let fixture = InMemoryPlatformClient::new(vec![video("v1", "c1", 5, now), video("v2", "c1", 50, now)]);
        let results = fixture.get_trending("US", 10).await.unwrap();
        assert_eq!(results[0].video_id, "v2");
    }
}
