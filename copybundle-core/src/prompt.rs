//! Image-prompt generation: pillar visual style + concepts extracted through
//! the completion provider, assembled into one core prompt plus canned
//! variations and persisted under the bundle's prompt directory.
//!
//! The completion call is mandatory. An unavailable provider or an unusable
//! response fails prompt generation outright; there is no algorithmic
//! fallback to canned concepts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contract::{CompletionError, CompletionProvider};
use crate::idea::{Idea, Pillar, ALL_PILLARS};

/// Fixed trailing quality phrase on the core prompt.
const QUALITY_SUFFIX: &str = "high detail, professional photography, vibrant color grading";

/// Alternate mood/composition phrases substituted into variations.
const VARIATION_PHRASES: [&str; 3] = [
    "cinematic composition, golden hour light",
    "dramatic lighting, high contrast",
    "wide angle lens, environmental context",
];

/// Minimum usable concept phrases from the extraction call.
const MIN_CONCEPTS: usize = 3;
const MAX_CONCEPTS: usize = 5;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("failed to write prompt file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize core prompt: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Base visual style per pillar, resolved from configuration with full
/// fallback to the built-in table on any structural problem.
#[derive(Debug, Clone)]
pub struct StyleSet {
    styles: BTreeMap<String, String>,
}

fn default_style(pillar: Pillar) -> &'static str {
    match pillar {
        Pillar::SafetyEducation => "clean infographic style, calm blue palette, clear iconography",
        Pillar::TokenCommunity => "warm community photography, candid drivers, golden accents",
        Pillar::AdvocacyImpact => "documentary photo style, urban streets, determined faces",
        Pillar::ProductTips => "bright flat illustration, phone screens, friendly shapes",
        Pillar::SeasonalTrending => "vibrant seasonal scene, dynamic motion, festive color",
        Pillar::EntertainmentHumor => "playful cartoon style, exaggerated expressions, bold outlines",
    }
}

impl Default for StyleSet {
    fn default() -> Self {
        let styles = ALL_PILLARS
            .into_iter()
            .map(|p| (p.as_str().to_string(), default_style(p).to_string()))
            .collect();
        StyleSet { styles }
    }
}

impl StyleSet {
    /// Build from a style configuration document: an object with a
    /// `pillars` array of `{id, visual_style}` entries. Any missing or
    /// malformed entry triggers full fallback to the built-in table.
    pub fn from_config(doc: &serde_json::Value) -> (StyleSet, Vec<String>) {
        let mut warnings = Vec::new();

        let pillars = match doc.get("pillars").and_then(|v| v.as_array()) {
            Some(list) if doc.is_object() => list,
            _ => {
                warn!("style config invalid: expected object with 'pillars' array, using defaults");
                warnings.push(
                    "style config invalid: expected object with 'pillars' array; using built-in styles"
                        .to_string(),
                );
                return (StyleSet::default(), warnings);
            }
        };

        let mut styles = BTreeMap::new();
        for entry in pillars {
            let id = entry.get("id").and_then(|v| v.as_str());
            let style = entry.get("visual_style").and_then(|v| v.as_str());
            match (id, style) {
                (Some(id), Some(style)) => {
                    styles.insert(id.to_string(), style.to_string());
                }
                _ => {
                    warn!(?entry, "malformed pillar style entry, falling back to built-in styles");
                    warnings.push(
                        "style config entry missing 'id' or 'visual_style'; using built-in styles"
                            .to_string(),
                    );
                    return (StyleSet::default(), warnings);
                }
            }
        }

        (StyleSet { styles }, warnings)
    }

    /// Base style for a pillar id; unknown pillars get the default style of
    /// the token_community pillar's visual register.
    pub fn resolve(&self, pillar_id: &str) -> String {
        if let Some(style) = self.styles.get(pillar_id) {
            return style.clone();
        }
        match Pillar::parse(pillar_id) {
            Some(p) => default_style(p).to_string(),
            None => default_style(Pillar::TokenCommunity).to_string(),
        }
    }
}

/// Parameters of one prompt-generation run.
#[derive(Debug, Clone)]
pub struct PromptParams {
    pub num_variations: usize,
    pub aspect_ratio: String,
    pub version: String,
}

impl Default for PromptParams {
    fn default() -> Self {
        PromptParams {
            num_variations: 2,
            aspect_ratio: "1:1".to_string(),
            version: "6".to_string(),
        }
    }
}

/// Paths of everything the generator persisted.
#[derive(Debug, Clone)]
pub struct PromptArtifacts {
    pub core_json: PathBuf,
    pub core_txt: PathBuf,
    pub variations: Vec<PathBuf>,
}

impl PromptArtifacts {
    pub fn count(&self) -> usize {
        // core prompt counts once, each variation once
        1 + self.variations.len()
    }
}

/// Structured core prompt document persisted alongside the plain text.
#[derive(Debug, Serialize)]
struct CorePromptDoc<'a> {
    idea_id: &'a str,
    pillar_id: &'a str,
    base_style: &'a str,
    concepts: &'a [String],
    prompt: &'a str,
    aspect_ratio: &'a str,
    version: &'a str,
    generated_timestamp: String,
}

/// Generate and persist the core prompt plus variations for one idea.
pub async fn generate<P: CompletionProvider + ?Sized>(
    provider: &P,
    idea: &Idea,
    styles: &StyleSet,
    params: &PromptParams,
    prompts_dir: &Path,
) -> Result<PromptArtifacts, PromptError> {
    let base_style = styles.resolve(&idea.pillar);

    let extraction_prompt = build_extraction_prompt(idea);
    debug!(idea_id = %idea.id, "requesting visual concepts from completion provider");
    let response = provider.complete(&extraction_prompt).await?;
    let concepts = parse_concepts(&response)?;
    info!(idea_id = %idea.id, concepts = concepts.len(), "extracted visual concepts");

    let core_prompt = format!(
        "{}, {}, {}, --ar {} --v {}",
        concepts.join(", "),
        base_style,
        QUALITY_SUFFIX,
        params.aspect_ratio,
        params.version,
    );

    fs::create_dir_all(prompts_dir)?;

    let core_json = prompts_dir.join("core_prompt.json");
    let doc = CorePromptDoc {
        idea_id: &idea.id,
        pillar_id: &idea.pillar,
        base_style: &base_style,
        concepts: &concepts,
        prompt: &core_prompt,
        aspect_ratio: &params.aspect_ratio,
        version: &params.version,
        generated_timestamp: chrono::Utc::now().to_rfc3339(),
    };
    fs::write(&core_json, serde_json::to_string_pretty(&doc)?)?;

    let core_txt = prompts_dir.join("core_prompt.txt");
    fs::write(&core_txt, &core_prompt)?;

    // Canned variants only: requests beyond the phrase table are capped.
    let variation_count = params.num_variations.min(VARIATION_PHRASES.len());
    let mut variations = Vec::with_capacity(variation_count);
    for (n, phrase) in VARIATION_PHRASES.iter().take(variation_count).enumerate() {
        let varied = core_prompt.replace(QUALITY_SUFFIX, phrase);
        let path = prompts_dir.join(format!("variation_{}.txt", n + 1));
        fs::write(&path, varied)?;
        variations.push(path);
    }

    info!(
        idea_id = %idea.id,
        variations = variations.len(),
        dir = %prompts_dir.display(),
        "prompt artifacts written"
    );
    Ok(PromptArtifacts {
        core_json,
        core_txt,
        variations,
    })
}

/// The instruction sent to the completion provider.
fn build_extraction_prompt(idea: &Idea) -> String {
    let mut context = idea.message.clone();
    if let Some(source) = &idea.source_idea {
        if !source.title.is_empty() {
            context.push_str("\nSource: ");
            context.push_str(&source.title);
        }
        for point in &source.key_points {
            context.push_str("\n- ");
            context.push_str(point);
        }
    }
    format!(
        "List {MIN_CONCEPTS} to {MAX_CONCEPTS} short visual concept phrases \
         (one per line, no numbering) for a social media image about:\n{context}"
    )
}

/// Parse the provider response into 3-5 concept phrases. Too few usable
/// phrases is a hard failure, same as an empty response.
fn parse_concepts(response: &str) -> Result<Vec<String>, CompletionError> {
    if response.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }

    let concepts: Vec<String> = response
        .lines()
        .flat_map(|line| line.split(','))
        .map(|phrase| {
            phrase
                .trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim()
                .to_string()
        })
        .filter(|phrase| phrase.chars().count() >= 3)
        .take(MAX_CONCEPTS)
        .collect();

    if concepts.len() < MIN_CONCEPTS {
        return Err(CompletionError::Unusable(format!(
            "expected at least {MIN_CONCEPTS} concept phrases, got {}",
            concepts.len()
        )));
    }
    Ok(concepts)
}
