//! Loads the platform and visual-style configuration documents from a
//! config directory into typed core structures.
//!
//! This is the only place untrusted configuration JSON is parsed. Unlike
//! the idea input document, configuration problems are never fatal: every
//! defect degrades to the built-in defaults with a recorded warning, per
//! the pipeline's recoverable/configuration error class.

use std::path::Path;

use copybundle_core::constraints::ConstraintSet;
use copybundle_core::prompt::StyleSet;
use tracing::{info, warn};

const PLATFORMS_FILE: &str = "platforms.json";
const STYLES_FILE: &str = "visual_styles.json";

/// Resolved run configuration plus the warnings gathered while loading it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub constraints: ConstraintSet,
    pub styles: StyleSet,
    pub warnings: Vec<String>,
}

/// Load both configuration documents from `config_dir`.
///
/// A missing directory or file is not a defect, it simply means defaults
/// apply. A present-but-malformed document produces warnings and defaults.
pub fn load_run_config(config_dir: &Path) -> RunConfig {
    let mut warnings = Vec::new();

    let constraints = match read_json(&config_dir.join(PLATFORMS_FILE), &mut warnings) {
        Some(doc) => {
            let (set, mut config_warnings) = ConstraintSet::from_config(&doc);
            warnings.append(&mut config_warnings);
            set
        }
        None => ConstraintSet::default(),
    };

    let styles = match read_json(&config_dir.join(STYLES_FILE), &mut warnings) {
        Some(doc) => {
            let (set, mut config_warnings) = StyleSet::from_config(&doc);
            warnings.append(&mut config_warnings);
            set
        }
        None => StyleSet::default(),
    };

    info!(
        config_dir = %config_dir.display(),
        warnings = warnings.len(),
        "run configuration resolved"
    );
    RunConfig {
        constraints,
        styles,
        warnings,
    }
}

/// Read and parse one JSON document; `None` means "use defaults". Only a
/// file that exists but cannot be parsed adds a warning.
fn read_json(path: &Path, warnings: &mut Vec<String>) -> Option<serde_json::Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            info!(path = %path.display(), "config file absent, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "config file is not valid JSON, using defaults");
            warnings.push(format!(
                "config file {} is not valid JSON ({e}); using built-in defaults",
                path.display()
            ));
            None
        }
    }
}
