//! Keyword Registry (C3): due-for-search ordering on top of the store repository.

use chrono::Utc;
use ipguard_models::{KeywordStat, Priority};
use ipguard_store::KeywordRepository;

use crate::error::DiscoveryError;

pub struct KeywordRegistry<'a> {
    repo: &'a KeywordRepository<'a>,
}

impl<'a> KeywordRegistry<'a> {
    pub fn new(repo: &'a KeywordRepository<'a>) -> Self {
        Self { repo }
    }

    pub async fn get_or_create(&self, keyword: &str, initial_priority: Priority) -> Result<KeywordStat, DiscoveryError> {
        Ok(self.repo.get_or_create(keyword, initial_priority).await?)
    }

    pub async fn record_result(&self, keyword: &str, videos_found: u32, matches_found: u32) -> Result<KeywordStat, DiscoveryError> {
        Ok(self.repo.record_result(keyword, videos_found, matches_found).await?)
    }

    /// Up to `limit` due keywords, ordered by priority (HIGH first) then oldest
    /// `last_search` first (§4.3). The keyword set is config-sized, so this sorts the
    /// full list client-side rather than pushing ordering into the store.
    pub async fn due_for_search(&self, limit: usize) -> Result<Vec<KeywordStat>, DiscoveryError> {
        let now = Utc::now();
        let mut due: Vec<KeywordStat> = self.repo.list_all().await?.into_iter().filter(|k| k.is_due(now)).collect();
        due.sort_by_key(|k| (k.priority.rank(), k.last_search.unwrap_or(chrono::DateTime::<Utc>::MIN_UTC)));
        due.truncate(limit);
        Ok(due)
    }
}
