//! Daily platform-API quota ledger (§4.1, C1), CAS-guarded against concurrent scanners.

use chrono::Utc;
use ipguard_models::{QuotaOperation, QuotaUsage};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::error::StoreError;

const COLLECTION: &str = "quota_usage";
const MAX_CAS_ATTEMPTS: u32 = 5;

/// A ledger's `doc_id` is namespaced by `ledger_name` so independent budgets (the discovery
/// orchestrator's daily ledger, the risk analyzer's smaller `rescan_quota` sub-budget) never
/// collide on the same day's counter row even though they share a collection (§4.12).
pub struct QuotaRepository<'a> {
    client: &'a FirestoreClient,
    ledger_name: &'static str,
    daily_limit: u32,
}

impl<'a> QuotaRepository<'a> {
    pub fn new(client: &'a FirestoreClient, daily_limit: u32) -> Self {
        Self {
            client,
            ledger_name: "default",
            daily_limit,
        }
    }

    pub fn named(client: &'a FirestoreClient, ledger_name: &'static str, daily_limit: u32) -> Self {
        Self {
            client,
            ledger_name,
            daily_limit,
        }
    }

    fn doc_id(&self, day: chrono::NaiveDate) -> String {
        format!("{}-{}", self.ledger_name, day.format("%Y-%m-%d"))
    }

    /// Fetches today's ledger, creating a fresh zeroed one if today's bucket doesn't exist yet.
    pub async fn get_or_init_today(&self) -> Result<QuotaUsage, StoreError> {
        let day = QuotaUsage::day_bucket(Utc::now());
        let doc_id = self.doc_id(day);
        match self.client.get_document(COLLECTION, &doc_id).await? {
            Some(doc) => crate::types::fields_to_type(&doc.fields).map_err(StoreError::from),
            None => {
                let usage = QuotaUsage::new_for_day(day, self.daily_limit);
                self.client.create_document(COLLECTION, &doc_id, &usage).await?;
                Ok(usage)
            }
        }
    }

    pub async fn remaining(&self) -> Result<u32, StoreError> {
        Ok(self.get_or_init_today().await?.remaining())
    }

    /// Attempts to deduct `op`'s cost from today's ledger via optimistic-concurrency retry.
    /// Returns `Ok(false)` (no write performed) if there isn't enough quota left, even after
    /// re-reading current state — this is a legitimate "no" and not a retry exhaustion.
    pub async fn charge(&self, op: QuotaOperation) -> Result<bool, StoreError> {
        let day = QuotaUsage::day_bucket(Utc::now());
        let doc_id = self.doc_id(day);

        for attempt in 0..MAX_CAS_ATTEMPTS {
            let doc = match self.client.get_document(COLLECTION, &doc_id).await? {
                Some(doc) => doc,
                None => {
                    let usage = QuotaUsage::new_for_day(day, self.daily_limit);
                    self.client.create_document(COLLECTION, &doc_id, &usage).await?;
                    continue;
                }
            };
            let mut usage: QuotaUsage = crate::types::fields_to_type(&doc.fields)?;
            if !usage.charge(op) {
                debug!(?op, remaining = usage.remaining(), "quota charge rejected");
                return Ok(false);
            }

            let update_time = doc.update_time.clone().unwrap_or_default();
            match self
                .client
                .update_document_with_precondition(COLLECTION, &doc_id, &usage, &update_time)
                .await
            {
                Ok(_) => return Ok(true),
                Err(e) if e.is_precondition_failed() => {
                    debug!(attempt, "quota CAS conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::RetryExhausted {
            attempts: MAX_CAS_ATTEMPTS,
            source: Box::new(StoreError::UnexpectedResponse("quota CAS attempts exhausted".into())),
        })
    }
}
