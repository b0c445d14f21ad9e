//! Keyword-search performance ledger and due-for-search queries (§4.3, C3, C7).

use chrono::Utc;
use ipguard_models::{KeywordStat, Priority};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::error::StoreError;

const COLLECTION: &str = "keywords";
const MAX_CAS_ATTEMPTS: u32 = 5;

pub struct KeywordRepository<'a> {
    client: &'a FirestoreClient,
}

impl<'a> KeywordRepository<'a> {
    pub fn new(client: &'a FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, keyword: &str) -> Result<Option<KeywordStat>, StoreError> {
        match self.client.get_document(COLLECTION, keyword).await? {
            Some(doc) => Ok(Some(crate::types::fields_to_type(&doc.fields)?)),
            None => Ok(None),
        }
    }

    pub async fn get_or_create(&self, keyword: &str, initial_priority: Priority) -> Result<KeywordStat, StoreError> {
        if let Some(stat) = self.get(keyword).await? {
            return Ok(stat);
        }
        let stat = KeywordStat::new(keyword.to_string(), initial_priority);
        self.client.create_document(COLLECTION, keyword, &stat).await?;
        Ok(stat)
    }

    /// Records a completed search's outcome and its adaptive re-prioritization under CAS.
    pub async fn record_result(&self, keyword: &str, videos_found: u32, matches_found: u32) -> Result<KeywordStat, StoreError> {
        for attempt in 0..MAX_CAS_ATTEMPTS {
            let doc = self
                .client
                .get_document(COLLECTION, keyword)
                .await?
                .ok_or_else(|| StoreError::NotFound(keyword.to_string()))?;
            let mut stat: KeywordStat = crate::types::fields_to_type(&doc.fields)?;
            let now = Utc::now();
            stat.record_result(videos_found, matches_found, now);

            let update_time = doc.update_time.clone().unwrap_or_default();
            match self
                .client
                .update_document_with_precondition(COLLECTION, keyword, &stat, &update_time)
                .await
            {
                Ok(_) => return Ok(stat),
                Err(e) if e.is_precondition_failed() => {
                    debug!(attempt, keyword, "keyword CAS conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::RetryExhausted {
            attempts: MAX_CAS_ATTEMPTS,
            source: Box::new(StoreError::UnexpectedResponse(format!("keyword {keyword} CAS attempts exhausted"))),
        })
    }

    /// All registered keywords. Due-ness is cheap to evaluate client-side (`KeywordStat::is_due`)
    /// against the small, config-sized keyword set, so unlike videos/channels this isn't a
    /// server-side range query.
    pub async fn list_all(&self) -> Result<Vec<KeywordStat>, StoreError> {
        let query = crate::types::StructuredQuery {
            from: vec![crate::types::CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: false,
            }],
            r#where: None,
            order_by: vec![],
            start_at: None,
            limit: Some(10_000),
        };
        self.client.run_query("", query).await
    }
}
