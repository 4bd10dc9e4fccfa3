//! CLI interface for copybundle: command parsing, argument validation and
//! the async entrypoint used by both `main` and integration tests.
//!
//! All business logic (adaptation, synthesis, bundle assembly) lives in
//! `copybundle-core`; this module is strictly CLI glue, exit-code mapping
//! and orchestration.
//!
//! Exit codes: 0 success, 2 success with warnings, 3 fatal input problem.
//! Provider failures surface as errors and exit 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use copybundle_core::bundle::{produce, BundleError, BundleOptions};
use copybundle_core::constraints::Platform;
use copybundle_core::idea::IdeaDocument;
use copybundle_core::synthesize::IdeaGenerator;
use tracing::{error, info, warn};

use crate::completion::ShellCompletionProvider;
use crate::load_config::load_run_config;

/// Exit code for fatal input problems (missing file, malformed JSON,
/// invalid idea).
const EXIT_INPUT_ERROR: i32 = 3;

/// CLI for copybundle: produce platform-adapted social copy bundles.
#[derive(Parser)]
#[clap(
    name = "copybundle",
    version,
    about = "Synthesize social post ideas and package platform-adapted copy, image prompts and a manifest into a distributable bundle"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Produce a bundle from the first idea in an idea document
    Produce {
        /// Path to the idea JSON document
        #[clap(long)]
        input: PathBuf,
        /// Directory bundles are created under
        #[clap(long, default_value = "output/bundles")]
        outdir: PathBuf,
        /// Comma-separated platform ids
        #[clap(long, default_value = "facebook,instagram,reddit")]
        platforms: String,
        /// Number of image-prompt variations
        #[clap(long, default_value_t = 2)]
        images: usize,
        /// Call-to-action text, appended when the idea has a source link
        #[clap(long)]
        cta: Option<String>,
        /// Skip zipping the bundle
        #[clap(long)]
        no_zip: bool,
        /// Skip image-prompt generation
        #[clap(long)]
        no_prompts: bool,
        /// Load curated golden quotes for the idea's source URL
        #[clap(long)]
        extract_quotes: bool,
        /// Directory holding platforms.json / visual_styles.json
        #[clap(long, default_value = "config")]
        config_dir: PathBuf,
        /// Directory holding curated quote side files
        #[clap(long, default_value = "data/golden_quotes")]
        quotes_dir: PathBuf,
        /// External text-completion command used for concept extraction
        #[clap(long, default_value = "llm")]
        completion_cmd: String,
    },
    /// Synthesize a batch of ideas from an input tree
    Synthesize {
        /// Root directory with seasonal/, human_insights/, external_feeds/
        #[clap(long)]
        input_dir: PathBuf,
        /// Where to write the idea batch JSON
        #[clap(long)]
        out: PathBuf,
        /// Requested number of ideas (soft upper bound)
        #[clap(long, default_value_t = 9)]
        count: usize,
    },
}

/// Async CLI entrypoint; returns the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Produce {
            input,
            outdir,
            platforms,
            images,
            cta,
            no_zip,
            no_prompts,
            extract_quotes,
            config_dir,
            quotes_dir,
            completion_cmd,
        } => {
            run_produce(ProduceArgs {
                input,
                outdir,
                platforms,
                images,
                cta,
                no_zip,
                no_prompts,
                extract_quotes,
                config_dir,
                quotes_dir,
                completion_cmd,
            })
            .await
        }
        Commands::Synthesize {
            input_dir,
            out,
            count,
        } => run_synthesize(&input_dir, &out, count),
    }
}

struct ProduceArgs {
    input: PathBuf,
    outdir: PathBuf,
    platforms: String,
    images: usize,
    cta: Option<String>,
    no_zip: bool,
    no_prompts: bool,
    extract_quotes: bool,
    config_dir: PathBuf,
    quotes_dir: PathBuf,
    completion_cmd: String,
}

async fn run_produce(args: ProduceArgs) -> Result<i32> {
    // Fatal input class: missing file or malformed JSON is exit 3, not a
    // propagated error.
    let content = match std::fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            error!(error = %e, input = %args.input.display(), "cannot read input file");
            eprintln!("error: cannot read input file {}: {e}", args.input.display());
            return Ok(EXIT_INPUT_ERROR);
        }
    };
    let document: IdeaDocument = match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(e) => {
            error!(error = %e, input = %args.input.display(), "input is not a valid idea document");
            eprintln!("error: malformed idea document: {e}");
            return Ok(EXIT_INPUT_ERROR);
        }
    };
    // Only the first idea is consumed per production run.
    let idea = match document.ideas.first() {
        Some(idea) => idea,
        None => {
            eprintln!("error: idea document contains no ideas");
            return Ok(EXIT_INPUT_ERROR);
        }
    };

    let config = load_run_config(&args.config_dir);
    let mut carried_warnings = config.warnings;

    let mut requested_platforms = Vec::new();
    for id in args.platforms.split(',').filter(|s| !s.trim().is_empty()) {
        match id.parse::<Platform>() {
            Ok(platform) => requested_platforms.push(platform),
            Err(e) => {
                warn!(id = id.trim(), "skipping unknown platform");
                carried_warnings.push(format!("{e}; platform skipped"));
            }
        }
    }

    let options = BundleOptions {
        platforms: requested_platforms,
        outdir: args.outdir,
        source_file: args.input.display().to_string(),
        cta: args.cta,
        images: args.images,
        make_zip: !args.no_zip,
        generate_prompts: !args.no_prompts,
        extract_quotes: args.extract_quotes,
        quotes_dir: args.quotes_dir,
        carried_warnings,
    };

    let provider = ShellCompletionProvider::new(args.completion_cmd);
    match produce(idea, &options, &config.constraints, &config.styles, &provider).await {
        Ok(report) => {
            info!(
                bundle = %report.bundle_dir.display(),
                warnings = report.warnings.len(),
                "bundle produced"
            );
            println!("bundle: {}", report.bundle_dir.display());
            if !report.warnings.is_empty() {
                println!("completed with {} warning(s), see report.txt", report.warnings.len());
            }
            Ok(report.status.exit_code())
        }
        Err(BundleError::InvalidIdea(reason)) => {
            error!(reason = %reason, "idea failed validation");
            eprintln!("error: invalid idea: {reason}");
            Ok(EXIT_INPUT_ERROR)
        }
        // Dependency and IO faults propagate as hard errors (exit 1).
        Err(e) => Err(e).context("bundle production failed"),
    }
}

fn run_synthesize(input_dir: &PathBuf, out: &PathBuf, count: usize) -> Result<i32> {
    let generator = IdeaGenerator::new(input_dir);
    let mut rng = rand::thread_rng();
    let batch = generator.generate(&mut rng, count);

    if let Some(error) = &batch.error {
        // No input anywhere: report and write nothing.
        error!(error = %error, "idea synthesis produced no ideas");
        eprintln!("error: {error}");
        return Ok(EXIT_INPUT_ERROR);
    }

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    std::fs::write(out, serde_json::to_string_pretty(&batch)?)
        .with_context(|| format!("writing idea batch to {}", out.display()))?;

    info!(total = batch.total_ideas, out = %out.display(), "idea batch written");
    println!("wrote {} idea(s) to {}", batch.total_ideas, out.display());
    Ok(0)
}
