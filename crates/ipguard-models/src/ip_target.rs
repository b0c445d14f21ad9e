//! Configured IP catalog entries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::IpTargetId;

/// Coarse scan priority shared by IP targets and keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordering key used when sorting "due" work: HIGH first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// One priority level down, saturating at `Low`.
    pub fn demote(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::Low,
        }
    }
}

/// Commercial value tier of an IP target, used only for reporting/prioritization context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueTier {
    Aaa,
    Aa,
    A,
    B,
    C,
}

/// A configured franchise/character set whose likeness the system monitors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IpTarget {
    pub id: IpTargetId,
    pub name: String,
    pub owner: String,
    pub priority: Priority,
    pub value_tier: ValueTier,
    pub character_names: Vec<String>,
    pub ai_tool_keywords: Vec<String>,
}

impl IpTarget {
    /// Lowercased character names, for substring matching.
    pub fn character_names_lower(&self) -> Vec<String> {
        self.character_names.iter().map(|s| s.to_lowercase()).collect()
    }

    /// Lowercased AI-tool keywords, for substring matching.
    pub fn ai_tool_keywords_lower(&self) -> Vec<String> {
        self.ai_tool_keywords.iter().map(|s| s.to_lowercase()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn demote_saturates_at_low() {
        assert_eq!(Priority::High.demote(), Priority::Medium);
        assert_eq!(Priority::Medium.demote(), Priority::Low);
        assert_eq!(Priority::Low.demote(), Priority::Low);
    }
}
