//! High-level pipeline: orchestrates adapt → prompts → quotes → manifest →
//! report → archive for one idea.
//!
//! The assembler favors producing a usable, flagged bundle over hard
//! failure: configuration, content and length defects become warnings that
//! land in both `manifest.json` (machine-readable) and `report.txt`
//! (human-readable). Only invalid input and a failing completion provider
//! abort the run.
//!
//! # Navigation
//! - Main entrypoint: [`produce`]
//! - Supporting types: [`BundleOptions`], [`BundleReport`], [`Manifest`]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::adapt::{adapt, PlatformCopy};
use crate::constraints::{ConstraintSet, Platform};
use crate::contract::CompletionProvider;
use crate::idea::Idea;
use crate::prompt::{self, PromptError, PromptParams, StyleSet};
use crate::quotes::{self, GoldenQuotes};

/// Floor on requested prompt variations.
const MIN_VARIATIONS: usize = 2;

#[derive(Debug, Error)]
pub enum BundleError {
    /// Fatal input problem; the CLI maps this to exit code 3.
    #[error("invalid idea: {0}")]
    InvalidIdea(String),
    /// Prompt generation failed; propagates as a hard error.
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("bundle io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Options for one production run.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub platforms: Vec<Platform>,
    pub outdir: PathBuf,
    /// Recorded in the manifest for provenance.
    pub source_file: String,
    pub cta: Option<String>,
    /// Requested prompt variations (floored at 2).
    pub images: usize,
    pub make_zip: bool,
    pub generate_prompts: bool,
    pub extract_quotes: bool,
    pub quotes_dir: PathBuf,
    /// Warnings gathered before assembly (config fallbacks, skipped
    /// platforms); aggregated into the manifest and report with the rest.
    pub carried_warnings: Vec<String>,
}

/// Quality counters aggregated into the manifest and report.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Counts {
    pub trims: usize,
    pub fallbacks: usize,
    pub prompts: usize,
    pub quotes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Validations {
    pub warnings: Vec<String>,
    pub counts: Counts,
}

/// Relative file path(s) for one platform's copy.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PlatformFiles {
    Single(String),
    Reddit { title: String, body: String },
}

/// `manifest.json`, the machine-readable summary of the bundle.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub idea_id: String,
    pub source_file: String,
    pub pillar_id: String,
    pub generated_timestamp: String,
    /// Null unless a source link existed to point the CTA at.
    pub cta_placeholder: Option<String>,
    pub platforms: BTreeMap<String, PlatformFiles>,
    pub image_prompts: BTreeMap<String, String>,
    pub golden_quotes: Option<GoldenQuotes>,
    pub validations: Validations,
}

/// Overall outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    /// Completed, but warnings were recorded; inspect the report.
    Warnings,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::Warnings => 2,
        }
    }
}

/// What a run produced, returned to the caller for logging and exit-code
/// mapping.
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub bundle_dir: PathBuf,
    pub status: RunStatus,
    pub counts: Counts,
    pub warnings: Vec<String>,
    pub zip_path: Option<PathBuf>,
}

/// Produce a bundle for one idea.
///
/// Writes `copy/` per platform, optional `images/prompts/`, `manifest.json`,
/// `report.txt` and an optional zip of the whole tree, all under a fresh
/// `<idea_id>_<YYYYMMDD_HHMMSS>/` directory in `options.outdir`.
pub async fn produce<P: CompletionProvider + ?Sized>(
    idea: &Idea,
    options: &BundleOptions,
    constraints: &ConstraintSet,
    styles: &StyleSet,
    provider: &P,
) -> Result<BundleReport, BundleError> {
    validate_idea(idea)?;

    let timestamp = chrono::Utc::now();
    let bundle_name = format!("{}_{}", idea.id, timestamp.format("%Y%m%d_%H%M%S"));
    let bundle_dir = options.outdir.join(&bundle_name);
    let copy_dir = bundle_dir.join("copy");
    fs::create_dir_all(&copy_dir)?;
    info!(bundle = %bundle_dir.display(), "assembling bundle");

    let mut counts = Counts::default();
    let mut warnings: Vec<String> = options.carried_warnings.clone();

    let source_href = idea.source_idea.as_ref().map(|s| s.href.as_str());
    // CTA only applies when there is somewhere for it to point.
    let cta_placeholder = match (&options.cta, source_href) {
        (Some(cta), Some(_)) => Some(cta.clone()),
        _ => None,
    };

    // --- Step 1: per-platform copy ---
    let mut platform_files: BTreeMap<String, PlatformFiles> = BTreeMap::new();
    for &platform in &options.platforms {
        let text = match idea.platform_adaptations.get(platform.as_str()) {
            Some(precomputed) => precomputed.as_str(),
            None => {
                counts.fallbacks += 1;
                warnings.push(format!(
                    "platform '{platform}': no precomputed adaptation, fell back to generic variant"
                ));
                idea.variants["generic"].as_str()
            }
        };

        let copy = adapt(
            platform,
            text,
            options.cta.as_deref(),
            source_href,
            constraints,
        );
        if copy.was_trimmed() {
            counts.trims += 1;
            warnings.push(format!(
                "platform '{platform}': copy exceeded length limits and was trimmed"
            ));
        }

        match copy {
            PlatformCopy::Single(adapted) => {
                let rel = format!("copy/{}.txt", platform);
                fs::write(bundle_dir.join(&rel), &adapted.text)?;
                platform_files.insert(platform.as_str().to_string(), PlatformFiles::Single(rel));
            }
            PlatformCopy::Reddit(post) => {
                let title_rel = "copy/reddit_title.txt".to_string();
                let body_rel = "copy/reddit_body.txt".to_string();
                fs::write(bundle_dir.join(&title_rel), &post.title)?;
                fs::write(bundle_dir.join(&body_rel), &post.body)?;
                platform_files.insert(
                    platform.as_str().to_string(),
                    PlatformFiles::Reddit {
                        title: title_rel,
                        body: body_rel,
                    },
                );
            }
        }
    }

    // --- Step 2: image prompts ---
    let mut image_prompts: BTreeMap<String, String> = BTreeMap::new();
    if options.generate_prompts {
        let params = PromptParams {
            num_variations: options.images.max(MIN_VARIATIONS),
            ..PromptParams::default()
        };
        let prompts_dir = bundle_dir.join("images").join("prompts");
        let artifacts = prompt::generate(provider, idea, styles, &params, &prompts_dir).await?;
        counts.prompts = artifacts.count();
        image_prompts.insert(
            "core_prompt_json".to_string(),
            relative_to(&artifacts.core_json, &bundle_dir),
        );
        image_prompts.insert(
            "core_prompt_txt".to_string(),
            relative_to(&artifacts.core_txt, &bundle_dir),
        );
        for (n, path) in artifacts.variations.iter().enumerate() {
            image_prompts.insert(format!("variation_{}", n + 1), relative_to(path, &bundle_dir));
        }
    }

    // --- Step 3: golden quotes ---
    let golden_quotes = if options.extract_quotes {
        match source_href {
            Some(url) => {
                let loaded = quotes::load_for_source(&options.quotes_dir, url);
                if let Some(q) = &loaded {
                    counts.quotes = q.count;
                }
                loaded
            }
            None => {
                warnings.push(
                    "quote extraction requested but idea has no source link".to_string(),
                );
                None
            }
        }
    } else {
        None
    };

    // --- Step 4: manifest + report ---
    let manifest = Manifest {
        idea_id: idea.id.clone(),
        source_file: options.source_file.clone(),
        pillar_id: idea.pillar.clone(),
        generated_timestamp: timestamp.to_rfc3339(),
        cta_placeholder,
        platforms: platform_files,
        image_prompts,
        golden_quotes,
        validations: Validations {
            warnings: warnings.clone(),
            counts,
        },
    };
    fs::write(
        bundle_dir.join("manifest.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    fs::write(bundle_dir.join("report.txt"), render_report(&manifest))?;

    // --- Step 5: archive ---
    let zip_path = if options.make_zip {
        let path = write_zip(&bundle_dir, &bundle_name)?;
        info!(zip = %path.display(), "bundle archived");
        Some(path)
    } else {
        None
    };

    let status = if warnings.is_empty() {
        RunStatus::Clean
    } else {
        warn!(count = warnings.len(), "bundle completed with warnings");
        RunStatus::Warnings
    };
    info!(
        bundle = %bundle_dir.display(),
        trims = counts.trims,
        fallbacks = counts.fallbacks,
        prompts = counts.prompts,
        "bundle complete"
    );

    Ok(BundleReport {
        bundle_dir,
        status,
        counts,
        warnings,
        zip_path,
    })
}

/// Fail fast on a structurally unusable idea document.
fn validate_idea(idea: &Idea) -> Result<(), BundleError> {
    if idea.id.trim().is_empty() {
        return Err(BundleError::InvalidIdea("missing 'id'".to_string()));
    }
    if idea.pillar.trim().is_empty() {
        return Err(BundleError::InvalidIdea("missing 'pillar'".to_string()));
    }
    if idea.message.trim().is_empty() {
        return Err(BundleError::InvalidIdea("missing 'message'".to_string()));
    }
    if !idea.variants.contains_key("generic") {
        return Err(BundleError::InvalidIdea(
            "missing 'variants.generic'".to_string(),
        ));
    }
    Ok(())
}

/// Plain-text summary written next to the manifest.
fn render_report(manifest: &Manifest) -> String {
    let mut out = String::new();
    out.push_str(&format!("Bundle report for idea {}\n", manifest.idea_id));
    out.push_str(&format!("Pillar: {}\n", manifest.pillar_id));
    out.push_str(&format!("Generated: {}\n", manifest.generated_timestamp));
    out.push_str(&format!("Source file: {}\n\n", manifest.source_file));

    out.push_str(&format!("Platforms written: {}\n", manifest.platforms.len()));
    let c = &manifest.validations.counts;
    out.push_str(&format!(
        "Counts: trims={} fallbacks={} prompts={} quotes={}\n",
        c.trims, c.fallbacks, c.prompts, c.quotes
    ));

    if manifest.validations.warnings.is_empty() {
        out.push_str("\nNo warnings.\n");
    } else {
        out.push_str(&format!(
            "\nWarnings ({}):\n",
            manifest.validations.warnings.len()
        ));
        for warning in &manifest.validations.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }
    out
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Zip the bundle tree. Entry names are rooted at the bundle directory's
/// parent, so extraction recreates `<bundle_name>/...`. The archive itself
/// lives inside the bundle directory and is skipped while walking.
fn write_zip(bundle_dir: &Path, bundle_name: &str) -> Result<PathBuf, BundleError> {
    let zip_path = bundle_dir.join(format!("{bundle_name}.zip"));
    let file = File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);
    let zip_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    collect_files(bundle_dir, &mut files)?;
    files.sort();

    let mut buffer = Vec::new();
    for path in files {
        if path.extension().is_some_and(|ext| ext == "zip") {
            continue;
        }
        let rel = path.strip_prefix(bundle_dir).unwrap_or(&path);
        let entry_name = format!("{}/{}", bundle_name, rel.to_string_lossy().replace('\\', "/"));
        zip.start_file(entry_name, zip_options)?;
        let mut f = File::open(&path)?;
        buffer.clear();
        f.read_to_end(&mut buffer)?;
        zip.write_all(&buffer)?;
    }
    zip.finish()?;
    Ok(zip_path)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
