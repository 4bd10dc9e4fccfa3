use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use copybundle_core::bundle::{produce, BundleError, BundleOptions, RunStatus};
use copybundle_core::constraints::{ConstraintSet, Platform};
use copybundle_core::contract::{CompletionError, MockCompletionProvider};
use copybundle_core::idea::{Idea, SourceIdea, SourceType};
use copybundle_core::prompt::StyleSet;
use tempfile::tempdir;

fn generic_only_idea() -> Idea {
    let mut variants = BTreeMap::new();
    variants.insert(
        "generic".to_string(),
        // 60 chars: inside facebook's default target window.
        "Check your mirrors and tire pressure before every shift. Go!".to_string(),
    );
    Idea {
        id: "idea_42".to_string(),
        pillar: "safety_education".to_string(),
        source_type: SourceType::Seasonal,
        message: "Pre-shift vehicle checks prevent most avoidable incidents".to_string(),
        variants,
        platform_adaptations: BTreeMap::new(),
        hashtags: vec!["#GigEconomy".to_string()],
        source_idea: None,
    }
}

fn options(outdir: PathBuf) -> BundleOptions {
    BundleOptions {
        platforms: vec![Platform::Facebook, Platform::Reddit],
        outdir,
        source_file: "ideas.json".to_string(),
        cta: None,
        images: 2,
        make_zip: false,
        generate_prompts: false,
        extract_quotes: false,
        quotes_dir: PathBuf::from("data/golden_quotes"),
        carried_warnings: Vec::new(),
    }
}

fn quiet_provider() -> MockCompletionProvider {
    // Never expected to be called unless prompts are enabled.
    MockCompletionProvider::new()
}

#[tokio::test]
async fn generic_fallback_counts_and_reddit_files() {
    let dir = tempdir().unwrap();
    let idea = generic_only_idea();
    let opts = options(dir.path().to_path_buf());

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();

    // Both requested platforms lacked a precomputed adaptation.
    assert_eq!(report.counts.fallbacks, 2);
    assert_eq!(report.status, RunStatus::Warnings);
    assert_eq!(report.status.exit_code(), 2);

    assert!(report.bundle_dir.join("copy/facebook.txt").exists());
    assert!(report.bundle_dir.join("copy/reddit_title.txt").exists());
    assert!(report.bundle_dir.join("copy/reddit_body.txt").exists());
    assert!(report.bundle_dir.join("manifest.json").exists());
    assert!(report.bundle_dir.join("report.txt").exists());
    assert!(report.zip_path.is_none());

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report.bundle_dir.join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["idea_id"], "idea_42");
    assert_eq!(manifest["validations"]["counts"]["fallbacks"], 2);
    assert_eq!(manifest["validations"]["counts"]["trims"], 0);
    assert_eq!(manifest["platforms"]["facebook"], "copy/facebook.txt");
    assert_eq!(manifest["platforms"]["reddit"]["title"], "copy/reddit_title.txt");
    assert_eq!(manifest["platforms"]["reddit"]["body"], "copy/reddit_body.txt");
    assert!(manifest["cta_placeholder"].is_null());
    assert!(manifest["golden_quotes"].is_null());
}

#[tokio::test]
async fn precomputed_adaptations_produce_a_clean_run() {
    let dir = tempdir().unwrap();
    let mut idea = generic_only_idea();
    idea.platform_adaptations.insert(
        "facebook".to_string(),
        "Quick pre-shift checks keep every ride safer out there today".to_string(),
    );
    let mut opts = options(dir.path().to_path_buf());
    opts.platforms = vec![Platform::Facebook];

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Clean);
    assert_eq!(report.status.exit_code(), 0);
    assert_eq!(report.counts.fallbacks, 0);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn missing_required_fields_fail_fast() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path().to_path_buf());
    let constraints = ConstraintSet::default();
    let styles = StyleSet::default();

    let mut no_generic = generic_only_idea();
    no_generic.variants.clear();
    let err = produce(&no_generic, &opts, &constraints, &styles, &quiet_provider())
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::InvalidIdea(ref m) if m.contains("generic")));

    let mut no_message = generic_only_idea();
    no_message.message.clear();
    let err = produce(&no_message, &opts, &constraints, &styles, &quiet_provider())
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::InvalidIdea(ref m) if m.contains("message")));

    let mut no_id = generic_only_idea();
    no_id.id = "  ".to_string();
    let err = produce(&no_id, &opts, &constraints, &styles, &quiet_provider())
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::InvalidIdea(_)));
}

#[tokio::test]
async fn prompt_generation_floors_variations_at_two() {
    let dir = tempdir().unwrap();
    let mut idea = generic_only_idea();
    idea.source_idea = Some(SourceIdea {
        href: "http://example.com/safety".to_string(),
        title: "Safety checks".to_string(),
        key_points: vec![],
    });

    let mut provider = MockCompletionProvider::new();
    provider.expect_complete().returning(|_| {
        Ok("reflective vest at dawn\ndashboard checklist\ncoffee thermos on seat".to_string())
    });

    let mut opts = options(dir.path().to_path_buf());
    opts.generate_prompts = true;
    opts.images = 1; // below the floor

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &provider,
    )
    .await
    .unwrap();

    let prompts_dir = report.bundle_dir.join("images/prompts");
    assert!(prompts_dir.join("core_prompt.json").exists());
    assert!(prompts_dir.join("core_prompt.txt").exists());
    assert!(prompts_dir.join("variation_1.txt").exists());
    assert!(prompts_dir.join("variation_2.txt").exists());
    assert!(!prompts_dir.join("variation_3.txt").exists());
    // core prompt + 2 variations
    assert_eq!(report.counts.prompts, 3);

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report.bundle_dir.join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        manifest["image_prompts"]["core_prompt_txt"],
        "images/prompts/core_prompt.txt"
    );
    assert_eq!(
        manifest["image_prompts"]["variation_2"],
        "images/prompts/variation_2.txt"
    );
}

#[tokio::test]
async fn provider_failure_aborts_the_run() {
    let dir = tempdir().unwrap();
    let idea = generic_only_idea();

    let mut provider = MockCompletionProvider::new();
    provider
        .expect_complete()
        .returning(|_| Err(CompletionError::Timeout(30)));

    let mut opts = options(dir.path().to_path_buf());
    opts.generate_prompts = true;

    let err = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &provider,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BundleError::Prompt(_)));
}

#[tokio::test]
async fn cta_is_recorded_and_applied_only_with_a_source_link() {
    let dir = tempdir().unwrap();
    let mut idea = generic_only_idea();
    idea.source_idea = Some(SourceIdea {
        href: "http://example.com/safety".to_string(),
        title: String::new(),
        key_points: vec![],
    });
    let mut opts = options(dir.path().to_path_buf());
    opts.platforms = vec![Platform::Facebook];
    opts.cta = Some("[Read the full guide]".to_string());

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();

    let copy = std::fs::read_to_string(report.bundle_dir.join("copy/facebook.txt")).unwrap();
    assert!(copy.ends_with("[Read the full guide]"));

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report.bundle_dir.join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["cta_placeholder"], "[Read the full guide]");
}

#[tokio::test]
async fn golden_quotes_load_from_side_file_and_absence_is_fine() {
    let dir = tempdir().unwrap();
    let quotes_dir = dir.path().join("quotes");
    std::fs::create_dir_all(&quotes_dir).unwrap();
    std::fs::write(
        quotes_dir.join("http___example.com_safety.json"),
        r#"[{"text": "It saved my shift", "source": "driver forum", "impact": "high"}]"#,
    )
    .unwrap();

    let mut idea = generic_only_idea();
    idea.source_idea = Some(SourceIdea {
        href: "http://example.com/safety".to_string(),
        title: String::new(),
        key_points: vec![],
    });
    let mut opts = options(dir.path().join("out"));
    opts.extract_quotes = true;
    opts.quotes_dir = quotes_dir;

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();
    assert_eq!(report.counts.quotes, 1);

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report.bundle_dir.join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["golden_quotes"]["extracted"], true);
    assert_eq!(manifest["golden_quotes"]["count"], 1);
    assert_eq!(manifest["golden_quotes"]["quotes"][0]["text"], "It saved my shift");

    // No curated file for a different idea: still succeeds, zero quotes.
    let mut other = generic_only_idea();
    other.source_idea = Some(SourceIdea {
        href: "http://example.com/other".to_string(),
        title: String::new(),
        key_points: vec![],
    });
    let report = produce(
        &other,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();
    assert_eq!(report.counts.quotes, 0);
}

#[tokio::test]
async fn zip_entries_are_rooted_at_the_bundle_parent() {
    let dir = tempdir().unwrap();
    let idea = generic_only_idea();
    let mut opts = options(dir.path().to_path_buf());
    opts.make_zip = true;

    let report = produce(
        &idea,
        &opts,
        &ConstraintSet::default(),
        &StyleSet::default(),
        &quiet_provider(),
    )
    .await
    .unwrap();

    let zip_path = report.zip_path.expect("zip requested");
    assert!(zip_path.exists());

    let bundle_name = report
        .bundle_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    assert!(archive.len() >= 5);
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.iter().all(|n| n.starts_with(&format!("{bundle_name}/"))));
    assert!(names.contains(&format!("{bundle_name}/manifest.json")));
    // The archive never contains itself.
    assert!(names.iter().all(|n| !n.ends_with(".zip")));
}
