//! The initial-risk factor table (§4.9), applied once by C2 at first persist.

use ipguard_models::ChannelProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialScoringFactor {
    TitleCharacterAndAiTool,
    TitleCharacterOnly,
    TitleAiToolOnly,
    TitleGenericFranchise,
    DescriptionTwoPlusAiToolMentions,
    DescriptionOneAiToolMention,
    DescriptionGenericAiMention,
    ChannelRateOver50,
    ChannelRateOver25,
    ChannelRateOver10,
    ChannelRateAboveZero,
    ViewsOver100k,
    ViewsOver10k,
    ViewsOver1k,
    TagsThreePlusMatches,
    TagsTwoMatches,
    TagsOneMatch,
    TrendingPrior,
}

impl InitialScoringFactor {
    pub fn label(self) -> &'static str {
        match self {
            InitialScoringFactor::TitleCharacterAndAiTool => "title_character_and_ai_tool",
            InitialScoringFactor::TitleCharacterOnly => "title_character_only",
            InitialScoringFactor::TitleAiToolOnly => "title_ai_tool_only",
            InitialScoringFactor::TitleGenericFranchise => "title_generic_franchise",
            InitialScoringFactor::DescriptionTwoPlusAiToolMentions => "description_two_plus_ai_tool_mentions",
            InitialScoringFactor::DescriptionOneAiToolMention => "description_one_ai_tool_mention",
            InitialScoringFactor::DescriptionGenericAiMention => "description_generic_ai_mention",
            InitialScoringFactor::ChannelRateOver50 => "channel_rate_over_50",
            InitialScoringFactor::ChannelRateOver25 => "channel_rate_over_25",
            InitialScoringFactor::ChannelRateOver10 => "channel_rate_over_10",
            InitialScoringFactor::ChannelRateAboveZero => "channel_rate_above_zero",
            InitialScoringFactor::ViewsOver100k => "views_over_100k",
            InitialScoringFactor::ViewsOver10k => "views_over_10k",
            InitialScoringFactor::ViewsOver1k => "views_over_1k",
            InitialScoringFactor::TagsThreePlusMatches => "tags_three_plus_matches",
            InitialScoringFactor::TagsTwoMatches => "tags_two_matches",
            InitialScoringFactor::TagsOneMatch => "tags_one_match",
            InitialScoringFactor::TrendingPrior => "trending_prior",
        }
    }
}

/// Everything C2 needs to know about a candidate video's text and matches to score it,
/// decoupled from the platform's raw video shape and from persistence.
pub struct InitialScoringInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub view_count: u64,
    pub matched_tag_count: u32,
    pub character_match_in_title: bool,
    pub ai_tool_match_in_title: bool,
    pub generic_franchise_match_in_title: bool,
    pub ai_tool_mentions_in_description: u32,
    pub generic_ai_mention_in_description: bool,
    pub recorded_as_trending: bool,
}

fn title_factor(input: &InitialScoringInput) -> Option<(InitialScoringFactor, i32)> {
    match (input.character_match_in_title, input.ai_tool_match_in_title) {
        (true, true) => Some((InitialScoringFactor::TitleCharacterAndAiTool, 60)),
        (true, false) => Some((InitialScoringFactor::TitleCharacterOnly, 30)),
        (false, true) => Some((InitialScoringFactor::TitleAiToolOnly, 20)),
        (false, false) if input.generic_franchise_match_in_title => Some((InitialScoringFactor::TitleGenericFranchise, 10)),
        (false, false) => None,
    }
}

fn description_factor(input: &InitialScoringInput) -> Option<(InitialScoringFactor, i32)> {
    if input.ai_tool_mentions_in_description >= 2 {
        Some((InitialScoringFactor::DescriptionTwoPlusAiToolMentions, 20))
    } else if input.ai_tool_mentions_in_description == 1 {
        Some((InitialScoringFactor::DescriptionOneAiToolMention, 15))
    } else if input.generic_ai_mention_in_description {
        Some((InitialScoringFactor::DescriptionGenericAiMention, 5))
    } else {
        None
    }
}

fn channel_factor(channel: &ChannelProfile) -> Option<(InitialScoringFactor, i32)> {
    let rate = channel.infringement_rate();
    if rate > 0.50 {
        Some((InitialScoringFactor::ChannelRateOver50, 20))
    } else if rate > 0.25 {
        Some((InitialScoringFactor::ChannelRateOver25, 15))
    } else if rate > 0.10 {
        Some((InitialScoringFactor::ChannelRateOver10, 10))
    } else if rate > 0.0 {
        Some((InitialScoringFactor::ChannelRateAboveZero, 5))
    } else {
        None
    }
}

fn views_factor(input: &InitialScoringInput) -> Option<(InitialScoringFactor, i32)> {
    if input.view_count > 100_000 {
        Some((InitialScoringFactor::ViewsOver100k, 10))
    } else if input.view_count > 10_000 {
        Some((InitialScoringFactor::ViewsOver10k, 7))
    } else if input.view_count > 1_000 {
        Some((InitialScoringFactor::ViewsOver1k, 3))
    } else {
        None
    }
}

fn tags_factor(input: &InitialScoringInput) -> Option<(InitialScoringFactor, i32)> {
    match input.matched_tag_count {
        0 => None,
        1 => Some((InitialScoringFactor::TagsOneMatch, 3)),
        2 => Some((InitialScoringFactor::TagsTwoMatches, 7)),
        _ => Some((InitialScoringFactor::TagsThreePlusMatches, 10)),
    }
}

/// Computes `initial_risk`, clamped to `[0, 100]`, plus its itemized factor contributions.
pub fn initial_risk(input: &InitialScoringInput, channel: &ChannelProfile) -> (u8, Vec<(String, i32)>) {
    let mut total = 0i32;
    let mut contributions = Vec::new();

    for factor in [
        title_factor(input),
        description_factor(input),
        channel_factor(channel),
        views_factor(input),
        tags_factor(input),
    ]
    .into_iter()
    .flatten()
    {
        contributions.push(factor);
        total += factor.1;
    }

    if input.recorded_as_trending {
        contributions.push((InitialScoringFactor::TrendingPrior, 20));
        total += 20;
    }

    let clamped = total.clamp(0, 100) as u8;
    (
        clamped,
        contributions.into_iter().map(|(f, pts)| (f.label().to_string(), pts)).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipguard_models::ChannelId;

    fn base_input() -> InitialScoringInput<'static> {
        InitialScoringInput {
            title: "My Dog Playing",
            description: "just a dog",
            view_count: 100,
            matched_tag_count: 0,
            character_match_in_title: false,
            ai_tool_match_in_title: false,
            generic_franchise_match_in_title: false,
            ai_tool_mentions_in_description: 0,
            generic_ai_mention_in_description: false,
            recorded_as_trending: false,
        }
    }

    #[test]
    fn scenario_irrelevant_content_scores_zero() {
        let input = base_input();
        let channel = ChannelProfile::new(ChannelId::from_raw("c"), "c".into(), chrono::Utc::now());
        let (score, contributions) = initial_risk(&input, &channel);
        assert_eq!(score, 0);
        assert!(contributions.is_empty());
    }

    #[test]
    fn title_character_and_ai_tool_stacks_to_sixty() {
        let mut input = base_input();
        input.character_match_in_title = true;
        input.ai_tool_match_in_title = true;
        let channel = ChannelProfile::new(ChannelId::from_raw("c"), "c".into(), chrono::Utc::now());
        let (score, _) = initial_risk(&input, &channel);
        assert_eq!(score, 60);
    }

    #[test]
    fn score_clamps_at_one_hundred() {
        let mut input = base_input();
        input.character_match_in_title = true;
        input.ai_tool_match_in_title = true;
        input.ai_tool_mentions_in_description = 3;
        input.view_count = 200_000;
        input.matched_tag_count = 5;
        input.recorded_as_trending = true;
        let mut channel = ChannelProfile::new(ChannelId::from_raw("c"), "c".into(), chrono::Utc::now());
        channel.total_videos_scanned = 10;
        channel.confirmed_infringements = 8;
        let (score, _) = initial_risk(&input, &channel);
        assert_eq!(score, 100, "60+20+20+10+10+20=140 must clamp to 100");
    }
}
