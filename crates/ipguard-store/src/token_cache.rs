//! Caches the bearer token `gcp_auth` hands back, refreshing only once it's near expiry.

use std::sync::Arc;

use gcp_auth::{Token, TokenProvider};
use tokio::sync::RwLock;

use crate::error::StoreError;

const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

pub struct TokenCache {
    auth: Arc<dyn TokenProvider>,
    cached: RwLock<Option<Arc<Token>>>,
}

impl TokenCache {
    pub async fn new() -> Result<Self, StoreError> {
        let auth = gcp_auth::provider()
            .await
            .map_err(|e| StoreError::TokenAcquisition(e.to_string()))?;
        Ok(Self {
            auth,
            cached: RwLock::new(None),
        })
    }

    /// Returns a valid bearer token, reusing the cached one unless `gcp_auth` considers it
    /// close to expiry (it tracks this internally and only refetches when needed).
    pub async fn bearer_token(&self) -> Result<Arc<Token>, StoreError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if !token.has_expired() {
                return Ok(token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        if let Some(token) = guard.as_ref() {
            if !token.has_expired() {
                return Ok(token.clone());
            }
        }

        let token = self
            .auth
            .token(&[FIRESTORE_SCOPE])
            .await
            .map_err(|e| StoreError::TokenAcquisition(e.to_string()))?;
        *guard = Some(token.clone());
        Ok(token)
    }
}
