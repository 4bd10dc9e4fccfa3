//! Golden quotes: manually curated supplementary content, loaded from a
//! side file keyed by the idea's source URL. Absent by default; loading
//! never fails the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::idea::GoldenQuote;

/// Quotes loaded for one source URL, as recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenQuotes {
    pub extracted: bool,
    pub count: usize,
    pub quotes: Vec<GoldenQuote>,
    pub source_url: String,
}

/// Deterministic file stem for a source URL, matching the convention used
/// for downloaded-source directories.
fn file_stem_for(url: &str) -> String {
    url.replace('/', "_").replace(':', "_")
}

/// Load curated quotes for `source_url` from `quotes_dir`.
///
/// Missing file means no curation exists yet: `None`. A malformed file is
/// logged and also yields `None`; curation problems never fail a run.
pub fn load_for_source(quotes_dir: &Path, source_url: &str) -> Option<GoldenQuotes> {
    let path = quotes_dir.join(format!("{}.json", file_stem_for(source_url)));
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => {
            debug!(path = %path.display(), "no curated quotes file for source");
            return None;
        }
    };

    match serde_json::from_str::<Vec<GoldenQuote>>(&content) {
        Ok(quotes) => Some(GoldenQuotes {
            extracted: true,
            count: quotes.len(),
            quotes,
            source_url: source_url.to_string(),
        }),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "curated quotes file is malformed, ignoring");
            None
        }
    }
}
