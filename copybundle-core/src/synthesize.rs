//! Idea synthesis: combines raw input snippets with a content pillar and
//! (probabilistically) an audience segment into idea records.
//!
//! All randomness flows through an injected [`Rng`] so callers can pin the
//! sequence with a seeded generator and assert exact outputs.

use std::path::PathBuf;

use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constraints::{Platform, PLATFORM_ORDER};
use crate::idea::{Idea, IdeaBatch, Pillar, SourceType, ALL_PILLARS};
use crate::normalize::{normalize, truncate_chars};

/// Phrasing templates for the generic variant; `{}` is the input snippet.
const GENERIC_TEMPLATES: [&str; 5] = [
    "💡 {} — here's what every driver should know",
    "Real talk: {}. Who else has been there?",
    "{} 👀 More of this, please.",
    "PSA for the community: {}",
    "We keep saying it: {}. Pass it on.",
];

/// Templates for the gig_driver segment variant.
const SEGMENT_TEMPLATES: [&str; 3] = [
    "Gig drivers: {} — your shift, your rules.",
    "Between rides? {} Worth a read.",
    "For everyone grinding the app: {}",
];

/// Fixed base hashtag set, always present.
const BASE_HASHTAGS: [&str; 3] = ["#GigEconomy", "#DriverCommunity", "#EarnSmart"];

/// Maximum total hashtags per idea.
const MAX_HASHTAGS: usize = 5;

/// Snippet lengths feeding the templates, in characters.
const GENERIC_SNIPPET_LEN: usize = 40;
const SEGMENT_SNIPPET_LEN: usize = 35;

/// Probability of producing the gig_driver segment variant.
const SEGMENT_PROBABILITY: f64 = 0.3;

/// How many leading platforms get a preview adaptation at synthesis time.
const PREVIEW_PLATFORM_COUNT: usize = 3;

/// Synthesize one idea from an input snippet, pillar and source category.
pub fn synthesize<R: Rng>(
    rng: &mut R,
    input_text: &str,
    pillar: Pillar,
    source_type: SourceType,
) -> Idea {
    let message = normalize(input_text);

    let generic_snippet = snippet(&message, GENERIC_SNIPPET_LEN);
    let template = GENERIC_TEMPLATES[rng.gen_range(0..GENERIC_TEMPLATES.len())];
    let generic = template.replace("{}", &generic_snippet);

    let mut idea = Idea {
        id: format!("idea_{}", Uuid::new_v4().simple()),
        pillar: pillar.as_str().to_string(),
        source_type,
        message,
        variants: Default::default(),
        platform_adaptations: Default::default(),
        hashtags: hashtags_for(pillar),
        source_idea: None,
    };
    idea.variants.insert("generic".to_string(), generic);

    if rng.gen_bool(SEGMENT_PROBABILITY) {
        let segment_snippet = snippet(&idea.message, SEGMENT_SNIPPET_LEN);
        let template = SEGMENT_TEMPLATES[rng.gen_range(0..SEGMENT_TEMPLATES.len())];
        idea.variants
            .insert("gig_driver".to_string(), template.replace("{}", &segment_snippet));
    }

    for platform in PLATFORM_ORDER.into_iter().take(PREVIEW_PLATFORM_COUNT) {
        let preview = preview_adaptation(platform, &idea);
        idea.platform_adaptations
            .insert(platform.as_str().to_string(), preview);
    }

    debug!(
        id = %idea.id,
        pillar = %idea.pillar,
        variants = idea.variants.len(),
        "synthesized idea"
    );
    idea
}

/// Length-limited prefix of the input, trimmed of dangling whitespace.
fn snippet(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars).trim_end().to_string()
}

/// Base hashtag set plus up to 2 pillar tags, capped at 5 total.
fn hashtags_for(pillar: Pillar) -> Vec<String> {
    let mut tags: Vec<String> = BASE_HASHTAGS.iter().map(|t| t.to_string()).collect();
    tags.extend(pillar.hashtags().iter().map(|t| t.to_string()));
    tags.truncate(MAX_HASHTAGS);
    tags
}

/// Lightweight preview adaptation written into the idea at synthesis time.
/// This is not the production adapter: each platform just gets its own char
/// budget and formatting so downstream consumers see a plausible draft.
fn preview_adaptation(platform: Platform, idea: &Idea) -> String {
    let generic = idea
        .variants
        .get("generic")
        .map(String::as_str)
        .unwrap_or(&idea.message);
    match platform {
        Platform::Facebook => snippet(generic, 80),
        Platform::Instagram => {
            format!("{}\n{}", snippet(generic, 150), idea.hashtags.join(" "))
        }
        Platform::Linkedin => format!("{}\n\nThoughts?", snippet(generic, 300)),
        Platform::Twitter => snippet(generic, 240),
        Platform::Tiktok => snippet(generic, 60),
        Platform::Reddit => snippet(generic, 140),
    }
}

/// Batch synthesis over a tree of input files grouped by source category.
#[derive(Debug, Clone)]
pub struct IdeaGenerator {
    input_root: PathBuf,
}

/// Category subdirectories, iterated in this fixed order. Together with the
/// early exit below, the requested count is a soft upper bound.
const CATEGORIES: [(&str, SourceType); 3] = [
    ("seasonal", SourceType::Seasonal),
    ("human_insights", SourceType::HumanInsights),
    ("external_feeds", SourceType::ExternalFeeds),
];

impl IdeaGenerator {
    pub fn new(input_root: impl Into<PathBuf>) -> Self {
        IdeaGenerator {
            input_root: input_root.into(),
        }
    }

    /// Generate up to `count` ideas, drawing at most `count / 3` (floor 1)
    /// inputs from each category. If no input exists anywhere the batch
    /// carries an error marker and no ideas; placeholder content is never
    /// synthesized.
    pub fn generate<R: Rng>(&self, rng: &mut R, count: usize) -> IdeaBatch {
        let per_category = std::cmp::max(count / CATEGORIES.len(), 1);
        let mut ideas = Vec::new();
        let mut any_input = false;

        'categories: for (dir_name, source_type) in CATEGORIES {
            let snippets = self.read_category(dir_name);
            if !snippets.is_empty() {
                any_input = true;
            }
            for text in snippets.into_iter().take(per_category) {
                let pillar = ALL_PILLARS[rng.gen_range(0..ALL_PILLARS.len())];
                ideas.push(synthesize(rng, &text, pillar, source_type));
                if ideas.len() >= count {
                    break 'categories;
                }
            }
        }

        if !any_input {
            warn!(input_root = %self.input_root.display(), "no input content found in any source category");
            return IdeaBatch {
                total_ideas: 0,
                ideas: Vec::new(),
                error: Some(format!(
                    "no input content found under {}; expected text files in {:?}",
                    self.input_root.display(),
                    CATEGORIES.map(|(d, _)| d)
                )),
            };
        }

        info!(total = ideas.len(), requested = count, "idea batch generated");
        IdeaBatch {
            total_ideas: ideas.len(),
            ideas,
            error: None,
        }
    }

    /// Non-empty normalized contents of the text files in one category
    /// directory, in filename order for determinism.
    fn read_category(&self, dir_name: &str) -> Vec<String> {
        let dir = self.input_root.join(dir_name);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => {
                debug!(dir = %dir.display(), "category directory absent, skipping");
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        files
            .into_iter()
            .filter_map(|path| std::fs::read_to_string(&path).ok())
            .map(|content| normalize(&content))
            .filter(|content| !content.is_empty())
            .collect()
    }
}
