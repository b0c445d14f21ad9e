//! Channel profile persistence and due-for-scan queries (§4.4, C4, C6).

use chrono::{DateTime, Utc};
use ipguard_models::{ChannelProfile, ChannelTier};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::error::StoreError;
use crate::types::{Direction, FieldOp, Filter, Order, Value};

const COLLECTION: &str = "channels";
const MAX_CAS_ATTEMPTS: u32 = 5;

pub struct ChannelRepository<'a> {
    client: &'a FirestoreClient,
}

impl<'a> ChannelRepository<'a> {
    pub fn new(client: &'a FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, channel_id: &str) -> Result<Option<ChannelProfile>, StoreError> {
        match self.client.get_document(COLLECTION, channel_id).await? {
            Some(doc) => Ok(Some(crate::types::fields_to_type(&doc.fields)?)),
            None => Ok(None),
        }
    }

    pub async fn get_or_create(&self, channel_id: &str, channel_title: &str, now: DateTime<Utc>) -> Result<ChannelProfile, StoreError> {
        if let Some(profile) = self.get(channel_id).await? {
            return Ok(profile);
        }
        let profile = ChannelProfile::new(channel_id.into(), channel_title.to_string(), now);
        self.client.create_document(COLLECTION, channel_id, &profile).await?;
        Ok(profile)
    }

    /// Applies `mutate` under optimistic-concurrency retry (C4 post-scan counter updates).
    pub async fn update_with_cas(
        &self,
        channel_id: &str,
        mutate: impl Fn(&mut ChannelProfile),
    ) -> Result<ChannelProfile, StoreError> {
        for attempt in 0..MAX_CAS_ATTEMPTS {
            let doc = self
                .client
                .get_document(COLLECTION, channel_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(channel_id.to_string()))?;
            let mut profile: ChannelProfile = crate::types::fields_to_type(&doc.fields)?;
            mutate(&mut profile);
            profile.tier = ChannelTier::classify(
                profile.infringement_rate(),
                profile.total_videos_scanned,
                profile.confirmed_infringements,
            );

            let update_time = doc.update_time.clone().unwrap_or_default();
            match self
                .client
                .update_document_with_precondition(COLLECTION, channel_id, &profile, &update_time)
                .await
            {
                Ok(_) => return Ok(profile),
                Err(e) if e.is_precondition_failed() => {
                    debug!(attempt, channel_id, "channel CAS conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::RetryExhausted {
            attempts: MAX_CAS_ATTEMPTS,
            source: Box::new(StoreError::UnexpectedResponse(format!("channel {channel_id} CAS attempts exhausted"))),
        })
    }

    /// Channels due for a rescan, tier-priority first (PLATINUM ahead of GOLD ahead of
    /// SILVER...) then soonest-due within a tier. IGNORE-tier channels never surface here
    /// because `ChannelRegistry::mark_scanned` pushes their `next_scan_at` far into the
    /// future the moment they're classified IGNORE (§4.4) — IGNORE has no rescan interval
    /// of its own, so the registry is responsible for keeping them off this query.
    pub async fn due_for_scan(&self, now: DateTime<Utc>, limit: i32) -> Result<Vec<ChannelProfile>, StoreError> {
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
            // Over-fetch so the in-memory tier-priority sort below has enough to work with;
            // Firestore can't order by a derived rank field without storing it.
            limit: Some(limit.saturating_mul(4)),
        };
        let mut channels: Vec<ChannelProfile> = self.client.run_query("", query).await?;
        channels.sort_by_key(|c| (c.tier.rank(), c.next_scan_at));
        channels.truncate(limit as usize);
        Ok(channels)
    }
}
