use std::fs;

use copybundle::load_config::load_run_config;
use copybundle_core::constraints::Platform;
use tempfile::tempdir;

#[test]
fn valid_config_documents_override_defaults_without_warnings() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("platforms.json"),
        r#"{
  "platforms": [
    {
      "id": "facebook",
      "characteristics": { "optimal_length": "45-85 characters", "tone": "casual" }
    }
  ]
}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("visual_styles.json"),
        r#"{
  "pillars": [
    { "id": "product_tips", "visual_style": "isometric app illustration" }
  ]
}"#,
    )
    .unwrap();

    let config = load_run_config(dir.path());
    assert!(config.warnings.is_empty(), "{:?}", config.warnings);

    let facebook = config.constraints.resolve(Platform::Facebook);
    assert_eq!((facebook.target_min, facebook.target_max), (45, 85));
    assert_eq!(config.styles.resolve("product_tips"), "isometric app illustration");
}

#[test]
fn absent_config_directory_uses_defaults_silently() {
    let dir = tempdir().unwrap();
    let config = load_run_config(&dir.path().join("nope"));
    assert!(config.warnings.is_empty());
    assert_eq!(config.constraints.resolve(Platform::Twitter).hard_cap, 280);
}

#[test]
fn invalid_json_degrades_to_defaults_with_warnings() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("platforms.json"), "not-json: [:::").unwrap();

    let config = load_run_config(dir.path());
    assert_eq!(config.warnings.len(), 1);
    assert!(config.warnings[0].contains("not valid JSON"));
    assert_eq!(config.constraints.resolve(Platform::Facebook).target_min, 40);
}

#[test]
fn structural_violations_surface_as_warnings_not_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("platforms.json"), r#"{"platforms": "oops"}"#).unwrap();
    fs::write(dir.path().join("visual_styles.json"), r#"{"pillars": [{"id": "x"}]}"#).unwrap();

    let config = load_run_config(dir.path());
    assert_eq!(config.warnings.len(), 2);
    // Pipeline still has a complete constraint table and style set.
    assert_eq!(config.constraints.resolve(Platform::Instagram).soft_cap, 300);
    assert!(!config.styles.resolve("safety_education").is_empty());
}
