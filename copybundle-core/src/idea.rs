//! Data model for ideas, their variants and supplementary content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which input category produced an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Seasonal,
    HumanInsights,
    ExternalFeeds,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Seasonal => "seasonal",
            SourceType::HumanInsights => "human_insights",
            SourceType::ExternalFeeds => "external_feeds",
        }
    }
}

/// Content pillars. Idea documents carry the pillar as a free string so an
/// unrecognized id degrades gracefully; this enum covers the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    SafetyEducation,
    TokenCommunity,
    AdvocacyImpact,
    ProductTips,
    SeasonalTrending,
    EntertainmentHumor,
}

pub const ALL_PILLARS: [Pillar; 6] = [
    Pillar::SafetyEducation,
    Pillar::TokenCommunity,
    Pillar::AdvocacyImpact,
    Pillar::ProductTips,
    Pillar::SeasonalTrending,
    Pillar::EntertainmentHumor,
];

impl Pillar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::SafetyEducation => "safety_education",
            Pillar::TokenCommunity => "token_community",
            Pillar::AdvocacyImpact => "advocacy_impact",
            Pillar::ProductTips => "product_tips",
            Pillar::SeasonalTrending => "seasonal_trending",
            Pillar::EntertainmentHumor => "entertainment_humor",
        }
    }

    pub fn parse(id: &str) -> Option<Pillar> {
        ALL_PILLARS.into_iter().find(|p| p.as_str() == id)
    }

    /// Pillar-specific hashtags, appended after the base set.
    pub fn hashtags(&self) -> [&'static str; 2] {
        match self {
            Pillar::SafetyEducation => ["#RoadSafety", "#DriveSafe"],
            Pillar::TokenCommunity => ["#DriverToken", "#CommunityOwned"],
            Pillar::AdvocacyImpact => ["#DriverRights", "#FairPay"],
            Pillar::ProductTips => ["#ProTips", "#WorkSmarter"],
            Pillar::SeasonalTrending => ["#Trending", "#SeasonalSurge"],
            Pillar::EntertainmentHumor => ["#DriverLife", "#RoadStories"],
        }
    }
}

/// Reference metadata carried from the originating source, used for CTA
/// insertion and prompt generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIdea {
    pub href: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// A unit of content to be produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    /// Pillar id; kept as a string so unknown pillars degrade to defaults.
    pub pillar: String,
    pub source_type: SourceType,
    /// Base idea text; required by the bundle assembler.
    #[serde(default)]
    pub message: String,
    /// Variant name → generated text. "generic" is always present on
    /// synthesized ideas and required by the bundle assembler.
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
    /// Platform id → preview-adapted text. May be incomplete; consumers
    /// fall back to `variants["generic"]` when a key is absent.
    #[serde(default)]
    pub platform_adaptations: BTreeMap<String, String>,
    /// Up to 5 tags, always including the fixed base set.
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_idea: Option<SourceIdea>,
}

/// The `--input` document: a production run consumes only the first idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaDocument {
    pub ideas: Vec<Idea>,
}

/// Result of a batch synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaBatch {
    pub total_ideas: usize,
    pub ideas: Vec<Idea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Manually curated supplementary quote, loaded from a side file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenQuote {
    pub text: String,
    pub source: String,
    pub impact: String,
}
