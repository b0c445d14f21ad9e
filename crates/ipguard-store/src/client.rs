//! A thin REST client over `projects.databases.documents`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::token_cache::TokenCache;
use crate::types::{
    Document, RunQueryRequest, RunQueryResponseItem, StructuredQuery, ToFirestoreFields, Value,
};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";
const API_VERSION: &str = "v1";

#[derive(Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(200),
        }
    }
}

pub struct FirestoreClient {
    http: Client,
    tokens: TokenCache,
    project_id: String,
    database_id: String,
    retry: RetryPolicy,
}

impl FirestoreClient {
    pub async fn new(project_id: impl Into<String>, database_id: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self {
            http: Client::new(),
            tokens: TokenCache::new().await?,
            project_id: project_id.into(),
            database_id: database_id.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn documents_base(&self) -> String {
        format!(
            "{host}/{version}/projects/{project}/databases/{db}/documents",
            host = FIRESTORE_HOST,
            version = API_VERSION,
            project = self.project_id,
            db = self.database_id,
        )
    }

    async fn auth_header(&self) -> Result<String, StoreError> {
        let token = self.tokens.bearer_token().await?;
        Ok(format!("Bearer {}", token.as_str()))
    }

    /// Runs `op` with retries on retryable `StoreError`s, using exponential backoff.
    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.base_delay * 2u32.pow(attempt - 1);
                    warn!(attempt, ?delay, error = %err, "retrying firestore request");
                    metrics::counter!("firestore_request_retries_total").increment(1);
                    tokio::time::sleep(delay).await;
                }
                Err(err) if attempt >= self.retry.max_attempts => {
                    return Err(StoreError::RetryExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetches a document at `collection/doc_id`. `None` if it does not exist.
    pub async fn get_document(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, StoreError> {
        let url = format!("{}/{}/{}", self.documents_base(), collection, urlencoding::encode(doc_id));
        self.with_retry(|| async {
            let auth = self.auth_header().await?;
            let resp = self.http.get(&url).header("Authorization", &auth).send().await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let resp = check_status(resp).await?;
            let doc: Document = resp.json().await?;
            Ok(Some(doc))
        })
        .await
    }

    /// Creates a new document with a server-assigned name. Fails if `doc_id` already exists.
    pub async fn create_document<T: Serialize>(
        &self,
        collection: &str,
        doc_id: &str,
        value: &T,
    ) -> Result<Document, StoreError> {
        let url = format!("{}/{}?documentId={}", self.documents_base(), collection, urlencoding::encode(doc_id));
        let fields = value.to_firestore_fields()?;
        self.with_retry(|| async {
            let auth = self.auth_header().await?;
            let resp = self
                .http
                .post(&url)
                .header("Authorization", &auth)
                .json(&json!({ "fields": fields }))
                .send()
                .await?;
            let resp = check_status(resp).await?;
            Ok(resp.json().await?)
        })
        .await
    }

    /// Overwrites a document unconditionally.
    pub async fn update_document<T: Serialize>(
        &self,
        collection: &str,
        doc_id: &str,
        value: &T,
    ) -> Result<Document, StoreError> {
        self.update_document_inner(collection, doc_id, value, None).await
    }

    /// Overwrites a document, but only if its `updateTime` still matches `expected_update_time`
    /// (the value read alongside the document being modified). This is the optimistic-
    /// concurrency primitive every counter/CAS mutation in this crate is built on.
    pub async fn update_document_with_precondition<T: Serialize>(
        &self,
        collection: &str,
        doc_id: &str,
        value: &T,
        expected_update_time: &str,
    ) -> Result<Document, StoreError> {
        self.update_document_inner(collection, doc_id, value, Some(expected_update_time))
            .await
    }

    async fn update_document_inner<T: Serialize>(
        &self,
        collection: &str,
        doc_id: &str,
        value: &T,
        expected_update_time: Option<&str>,
    ) -> Result<Document, StoreError> {
        let url = format!("{}/{}/{}", self.documents_base(), collection, urlencoding::encode(doc_id));
        let fields = value.to_firestore_fields()?;
        let path = format!("{collection}/{doc_id}");
        self.with_retry(|| async {
            let auth = self.auth_header().await?;
            let mut req = self.http.patch(&url).header("Authorization", &auth).json(&json!({ "fields": fields }));
            if let Some(update_time) = expected_update_time {
                req = req.query(&[("currentDocument.updateTime", update_time)]);
            }
            let resp = req.send().await?;
            if resp.status() == StatusCode::PRECONDITION_FAILED || resp.status() == StatusCode::CONFLICT {
                return Err(StoreError::PreconditionFailed { path: path.clone() });
            }
            let resp = check_status(resp).await?;
            Ok(resp.json().await?)
        })
        .await
    }

    /// Atomic multi-document write, used for discovery's extract+persist+publish-adjacent
    /// writes where two documents must land together or not at all.
    pub async fn batch_write(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        let url = format!(
            "{host}/{version}/projects/{project}/databases/{db}/documents:batchWrite",
            host = FIRESTORE_HOST,
            version = API_VERSION,
            project = self.project_id,
            db = self.database_id,
        );
        self.with_retry(|| async {
            let auth = self.auth_header().await?;
            let resp = self
                .http
                .post(&url)
                .header("Authorization", &auth)
                .json(&json!({ "writes": writes }))
                .send()
                .await?;
            check_status(resp).await?;
            Ok(())
        })
        .await
    }

    /// Runs a structured query and deserializes each returned document's fields as `T`.
    pub async fn run_query<T: for<'de> Deserialize<'de>>(
        &self,
        parent_collection_path: &str,
        query: StructuredQuery,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}:runQuery", self.documents_base_for_parent(parent_collection_path));
        let body = RunQueryRequest { structured_query: query };
        let rows: Vec<RunQueryResponseItem> = self
            .with_retry(|| async {
                let auth = self.auth_header().await?;
                let resp = self.http.post(&url).header("Authorization", &auth).json(&body).send().await?;
                let resp = check_status(resp).await?;
                Ok(resp.json().await?)
            })
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(doc) = row.document {
                let value: T = crate::types::fields_to_type(&doc.fields)?;
                out.push(value);
            }
        }
        debug!(count = out.len(), "run_query returned documents");
        Ok(out)
    }

    fn documents_base_for_parent(&self, parent_collection_path: &str) -> String {
        if parent_collection_path.is_empty() {
            self.documents_base()
        } else {
            format!("{}/{}", self.documents_base(), parent_collection_path)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<WriteDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteDocument {
    pub name: String,
    pub fields: BTreeMap<String, Value>,
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let body = resp.text().await.unwrap_or_default();
            Err(StoreError::Unauthorized(body))
        }
        StatusCode::NOT_FOUND => Err(StoreError::NotFound(resp.url().to_string())),
        status if status.is_success() => Ok(resp),
        status => {
            let body = resp.text().await.unwrap_or_default();
            Err(StoreError::UnexpectedResponse(format!("{status}: {body}")))
        }
    }
}
