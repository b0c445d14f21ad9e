//! Append-only view-count samples backing the velocity tracker (§4.10, C10).

use chrono::{DateTime, Utc};
use ipguard_models::ViewSnapshot;

use crate::client::FirestoreClient;
use crate::error::StoreError;
use crate::types::{Direction, FieldOp, Filter, Order, Value};

const COLLECTION: &str = "view_snapshots";

pub struct ViewSnapshotRepository<'a> {
    client: &'a FirestoreClient,
}

impl<'a> ViewSnapshotRepository<'a> {
    pub fn new(client: &'a FirestoreClient) -> Self {
        Self { client }
    }

    /// Keyed by `(video_id, second-granularity timestamp)` so redelivered publishes collapse
    /// onto the same row instead of growing the series (§5 idempotence). `update_document` is
    /// an unconditional patch, which doubles as an upsert here — there's nothing to CAS
    /// against since every write with the same key carries the same content.
    pub async fn record(&self, snapshot: &ViewSnapshot) -> Result<(), StoreError> {
        let doc_id = format!("{}-{}", snapshot.video_id.as_str(), snapshot.sampled_at.timestamp());
        self.client.update_document(COLLECTION, &doc_id, snapshot).await?;
        Ok(())
    }

    /// Snapshots for `video_id` taken since `since`, oldest first, for velocity computation.
    pub async fn recent_for_video(&self, video_id: &str, since: DateTime<Utc>) -> Result<Vec<ViewSnapshot>, StoreError> {
        let query = crate::types::StructuredQuery {
            from: vec![crate::types::CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: false,
            }],
            r#where: Some(Filter::and(vec![
                Filter::field("video_id", FieldOp::Equal, Value::String(video_id.to_string())),
                Filter::field(
                    "sampled_at",
                    FieldOp::GreaterThanOrEqual,
                    Value::Timestamp(crate::types::timestamp_to_rfc3339(since)),
                ),
            ])),
            order_by: vec![Order::by("sampled_at", Direction::Ascending)],
            start_at: None,
            limit: Some(500),
        };
        self.client.run_query("", query).await
    }
}
