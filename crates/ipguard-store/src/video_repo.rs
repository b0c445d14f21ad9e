//! Video persistence: first-write risk snapshot, CAS-guarded rescoring, due-for-rescan
//! and risk-tier ordered queries (§3, §4.9, §4.12, C2, C11, C12).

use chrono::{DateTime, Utc};
use ipguard_models::{RiskTier, Video};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::error::StoreError;
use crate::types::{Direction, FieldOp, Filter, Order, Value};

const COLLECTION: &str = "videos";
const MAX_CAS_ATTEMPTS: u32 = 5;

pub struct VideoRepository<'a> {
    client: &'a FirestoreClient,
}

impl<'a> VideoRepository<'a> {
    pub fn new(client: &'a FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, video_id: &str) -> Result<Option<Video>, StoreError> {
        match self.client.get_document(COLLECTION, video_id).await? {
            Some(doc) => Ok(Some(crate::types::fields_to_type(&doc.fields)?)),
            None => Ok(None),
        }
    }

    /// Persists a newly-discovered video. Invariant #2 (§3): `initial_risk` is set here and
    /// never touched again; callers must have already set `video.initial_risk == video.current_risk`.
    pub async fn create(&self, video: &Video) -> Result<(), StoreError> {
        debug_assert_eq!(video.initial_risk, video.current_risk, "initial_risk must equal current_risk on first persist");
        self.client.create_document(COLLECTION, video.video_id.as_str(), video).await?;
        Ok(())
    }

    /// Applies `mutate` to the current document under optimistic-concurrency retry, so two
    /// concurrent rescoring paths (periodic tick + feedback handler, per §5) can't clobber
    /// each other's risk_history appends.
    pub async fn update_with_cas(
        &self,
        video_id: &str,
        mutate: impl Fn(&mut Video),
    ) -> Result<Video, StoreError> {
        for attempt in 0..MAX_CAS_ATTEMPTS {
            let doc = self
                .client
                .get_document(COLLECTION, video_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(video_id.to_string()))?;
            let mut video: Video = crate::types::fields_to_type(&doc.fields)?;
            let initial_risk = video.initial_risk;
            mutate(&mut video);
            debug_assert_eq!(video.initial_risk, initial_risk, "initial_risk must never change after first persist");

            let update_time = doc.update_time.clone().unwrap_or_default();
            match self
                .client
                .update_document_with_precondition(COLLECTION, video_id, &video, &update_time)
                .await
            {
                Ok(_) => return Ok(video),
                Err(e) if e.is_precondition_failed() => {
                    debug!(attempt, video_id, "video CAS conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::RetryExhausted {
            attempts: MAX_CAS_ATTEMPTS,
            source: Box::new(StoreError::UnexpectedResponse(format!("video {video_id} CAS attempts exhausted"))),
        })
    }

    /// Videos whose `next_scan_at` has elapsed, within each fetched batch ordered
    /// `current_risk` descending (§4.12, §5 "the rescore loop processes Videos in
    /// `(next_scan_at ascending, current_risk descending)` order within each batch").
    /// Firestore can't express a compound order across an inequality filter field and a
    /// second field without a composite index the design doesn't assume, so this over-fetches
    /// ordered by the filtered field and re-sorts the batch client-side before truncating —
    /// the same workaround used by `ChannelRepository::due_for_scan`.
    pub async fn due_for_rescan(&self, now: DateTime<Utc>, limit: i32) -> Result<Vec<Video>, StoreError> {
        let query = crate::types::StructuredQuery {
            from: vec![crate::types::CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: false,
            }],
            r#where: Some(Filter::field(
                "next_scan_at",
                FieldOp::LessThanOrEqual,
                Value::Timestamp(crate::types::timestamp_to_rfc3339(now)),
            )),
            order_by: vec![Order::by("next_scan_at", Direction::Ascending)],
            start_at: None,
            limit: Some(limit.saturating_mul(4)),
        };
        let mut videos: Vec<Video> = self.client.run_query("", query).await?;
        videos.sort_by(|a, b| b.current_risk.cmp(&a.current_risk));
        videos.truncate(limit as usize);
        Ok(videos)
    }

    /// Videos at or above `min_tier`, ordered highest-risk-first — used by reporting and by
    /// the high-risk publish path's backfill reconciliation.
    pub async fn by_risk_tier_at_least(&self, min_tier: RiskTier, limit: i32) -> Result<Vec<Video>, StoreError> {
        let query = crate::types::StructuredQuery {
            from: vec![crate::types::CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: false,
            }],
            r#where: Some(Filter::field(
                "current_risk",
                FieldOp::GreaterThanOrEqual,
                Value::Integer(min_tier_floor(min_tier).to_string()),
            )),
            order_by: vec![Order::by("current_risk", Direction::Descending)],
            start_at: None,
            limit: Some(limit),
        };
        self.client.run_query("", query).await
    }
}

fn min_tier_floor(tier: RiskTier) -> u8 {
    match tier {
        RiskTier::Critical => 90,
        RiskTier::High => 70,
        RiskTier::Medium => 40,
        RiskTier::Low => 20,
        RiskTier::VeryLow => 0,
    }
}
