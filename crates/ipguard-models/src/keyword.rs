//! The `KeywordStat` entity.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ip_target::Priority;

/// Per-keyword search performance and adaptive priority (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeywordStat {
    pub keyword: String,
    pub priority: Priority,
    pub searches_performed: u32,
    pub videos_found: u32,
    pub matches_found: u32,
    pub last_search: Option<DateTime<Utc>>,
    pub last_successful_find: Option<DateTime<Utc>>,
}

impl KeywordStat {
    /// A never-searched keyword, with its structurally-derived initial priority (§4.3).
    pub fn new(keyword: String, priority: Priority) -> Self {
        Self {
            keyword,
            priority,
            searches_performed: 0,
            videos_found: 0,
            matches_found: 0,
            last_search: None,
            last_successful_find: None,
        }
    }

    /// Derive the structural initial priority: both character + AI-tool terms present in the
    /// keyword text -> HIGH, either alone -> MEDIUM, neither -> LOW.
    pub fn derive_initial_priority(
        keyword: &str,
        character_names: &[String],
        ai_tool_keywords: &[String],
    ) -> Priority {
        let lower = keyword.to_lowercase();
        let has_character = character_names
            .iter()
            .any(|c| lower.contains(&c.to_lowercase()));
        let has_ai_tool = ai_tool_keywords
            .iter()
            .any(|t| lower.contains(&t.to_lowercase()));
        match (has_character, has_ai_tool) {
            (true, true) => Priority::High,
            (true, false) | (false, true) => Priority::Medium,
            (false, false) => Priority::Low,
        }
    }

    /// `matches_found / max(1, videos_found)`, per §4.3.
    pub fn match_rate(&self) -> f64 {
        self.matches_found as f64 / (self.videos_found.max(1) as f64)
    }

    /// Cooldown before this keyword is due again, by priority (§4.3 defaults).
    pub fn cooldown(priority: Priority) -> chrono::Duration {
        match priority {
            Priority::High => chrono::Duration::hours(2),
            Priority::Medium => chrono::Duration::hours(6),
            Priority::Low => chrono::Duration::hours(24),
        }
    }

    /// Whether this keyword is due for search at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_search {
            None => true,
            Some(last) => now - last >= Self::cooldown(self.priority),
        }
    }

    /// Record a completed search and apply adaptive priority (§4.3).
    pub fn record_result(&mut self, videos_found: u32, matches_found: u32, now: DateTime<Utc>) {
        self.searches_performed += 1;
        self.videos_found += videos_found;
        self.matches_found += matches_found;
        self.last_search = Some(now);
        if matches_found > 0 {
            self.last_successful_find = Some(now);
        }

        let rate = self.match_rate();
        self.priority = if rate >= 0.20 {
            Priority::High
        } else if rate >= 0.10 {
            Priority::Medium
        } else {
            Priority::Low
        };

        let stale = self
            .last_successful_find
            .map(|t| now - t > chrono::Duration::days(7))
            .unwrap_or(false);
        if stale {
            self.priority = self.priority.demote();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_initial_priority_requires_both_for_high() {
        let chars = vec!["Superman".to_string()];
        let tools = vec!["Sora".to_string()];
        assert_eq!(
            KeywordStat::derive_initial_priority("superman sora ai video", &chars, &tools),
            Priority::High
        );
        assert_eq!(
            KeywordStat::derive_initial_priority("superman cartoon", &chars, &tools),
            Priority::Medium
        );
        assert_eq!(
            KeywordStat::derive_initial_priority("random clip", &chars, &tools),
            Priority::Low
        );
    }

    #[test]
    fn scenario_6_keyword_adaptation() {
        let mut k = KeywordStat::new("k1".into(), Priority::Low);
        let t0 = Utc::now();
        k.record_result(40, 12, t0);
        assert_eq!(k.searches_performed, 1);
        assert!((k.match_rate() - 0.30).abs() < 1e-9);
        assert_eq!(k.priority, Priority::High);

        // Eight days later with no further successful find -> demoted to MEDIUM.
        let t1 = t0 + chrono::Duration::days(8);
        k.record_result(0, 0, t1);
        assert_eq!(k.priority, Priority::Medium);
    }

    #[test]
    fn is_due_respects_cooldown() {
        let mut k = KeywordStat::new("k".into(), Priority::High);
        let now = Utc::now();
        assert!(k.is_due(now));
        k.record_result(1, 0, now);
        assert!(!k.is_due(now + chrono::Duration::minutes(30)));
        assert!(k.is_due(now + chrono::Duration::hours(3)));
    }
}
