//! Per-platform length constraints: the configurable target window plus the
//! fixed soft/hard trim caps.
//!
//! Only the target window is sourced from configuration; trim thresholds are
//! code-level policy. A malformed configuration document never fails the
//! run: every structural violation is reported as a warning and the built-in
//! default table is used instead.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Supported publishing platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Linkedin,
    Twitter,
    Tiktok,
    Reddit,
}

/// Canonical platform ordering, used for preview adaptations and default
/// table construction.
pub const PLATFORM_ORDER: [Platform; 6] = [
    Platform::Facebook,
    Platform::Instagram,
    Platform::Linkedin,
    Platform::Twitter,
    Platform::Tiktok,
    Platform::Reddit,
];

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
            Platform::Reddit => "reddit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "twitter" | "x" => Ok(Platform::Twitter),
            "tiktok" => Ok(Platform::Tiktok),
            "reddit" => Ok(Platform::Reddit),
            other => Err(format!("unknown platform id: {other}")),
        }
    }
}

/// Resolved length constraints for one platform, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformLimits {
    pub target_min: usize,
    pub target_max: usize,
    /// Above this, copy is trimmed with an ellipsis.
    pub soft_cap: usize,
    /// Absolute maximum; excess is truncated outright.
    pub hard_cap: usize,
}

/// Reddit titles are derived, not trimmed, so the platform has its own caps.
pub const REDDIT_TITLE_MAX: usize = 140;
pub const REDDIT_BODY_MAX: usize = 10_000;

/// Default target window per platform, used when configuration is absent,
/// malformed, or carries no parseable range for the platform.
fn default_target(platform: Platform) -> (usize, usize) {
    match platform {
        Platform::Facebook => (40, 80),
        Platform::Instagram => (125, 150),
        Platform::Linkedin => (100, 300),
        Platform::Twitter => (100, 280),
        Platform::Tiktok => (20, 60),
        Platform::Reddit => (1, REDDIT_TITLE_MAX),
    }
}

/// Fixed trim thresholds per platform. Deliberately not configurable.
fn caps(platform: Platform) -> (usize, usize) {
    match platform {
        Platform::Facebook => (120, 500),
        Platform::Instagram => (300, 2200),
        Platform::Linkedin => (400, 3000),
        // No soft tier on twitter: any excess is truncated in one step.
        Platform::Twitter => (280, 280),
        Platform::Tiktok => (100, 150),
        Platform::Reddit => (REDDIT_BODY_MAX, REDDIT_BODY_MAX),
    }
}

/// The resolved constraint table for one run.
///
/// Built once (from configuration or defaults) and passed by reference into
/// the adapters; there is no process-global cache.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    limits: BTreeMap<Platform, PlatformLimits>,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        let mut limits = BTreeMap::new();
        for platform in PLATFORM_ORDER {
            let (target_min, target_max) = default_target(platform);
            let (soft_cap, hard_cap) = caps(platform);
            limits.insert(
                platform,
                PlatformLimits {
                    target_min,
                    target_max,
                    soft_cap,
                    hard_cap,
                },
            );
        }
        ConstraintSet { limits }
    }
}

impl ConstraintSet {
    /// Build a constraint set from a platform configuration document.
    ///
    /// The document must be an object with a `platforms` array whose entries
    /// each carry an `id` and a `characteristics` object. Any structural
    /// violation falls back to the full default table; a missing or
    /// unparseable range for a single platform falls back for that platform
    /// only. Warnings describe every fallback taken.
    pub fn from_config(doc: &serde_json::Value) -> (ConstraintSet, Vec<String>) {
        let mut warnings = Vec::new();
        let mut set = ConstraintSet::default();

        let platforms = match doc.get("platforms").and_then(|v| v.as_array()) {
            Some(list) if doc.is_object() => list,
            _ => {
                warn!("platform config is not an object with a 'platforms' array, using defaults");
                warnings.push(
                    "platform config invalid: expected object with 'platforms' array; using built-in defaults"
                        .to_string(),
                );
                return (set, warnings);
            }
        };

        for entry in platforms {
            let id = entry.get("id").and_then(|v| v.as_str());
            let characteristics = entry.get("characteristics");
            let (id, characteristics) = match (id, characteristics) {
                (Some(id), Some(c)) => (id, c),
                _ => {
                    warn!(?entry, "platform entry missing 'id' or 'characteristics'");
                    warnings.push(
                        "platform entry missing 'id' or 'characteristics'; entry skipped"
                            .to_string(),
                    );
                    continue;
                }
            };

            let platform = match id.parse::<Platform>() {
                Ok(p) => p,
                Err(e) => {
                    debug!(id, "ignoring unrecognized platform in config: {e}");
                    continue;
                }
            };

            let range_text = characteristics
                .get("optimal_length")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            match extract_range(range_text) {
                Some((mut lo, mut hi)) => {
                    if lo > hi {
                        warnings.push(format!(
                            "platform '{id}': reversed target range {lo}-{hi} swapped into order"
                        ));
                        std::mem::swap(&mut lo, &mut hi);
                    }
                    // Default table covers every platform, so the entry exists.
                    if let Some(limits) = set.limits.get_mut(&platform) {
                        limits.target_min = lo;
                        limits.target_max = hi;
                    }
                    debug!(platform = %platform, target_min = lo, target_max = hi, "resolved target window from config");
                }
                None => {
                    warnings.push(format!(
                        "platform '{id}': no parseable length range in {range_text:?}; using default target window"
                    ));
                }
            }
        }

        (set, warnings)
    }

    /// Resolve the limits for a platform. The table always covers every
    /// supported platform, so this never fails.
    pub fn resolve(&self, platform: Platform) -> PlatformLimits {
        self.limits[&platform]
    }
}

/// Extract the first two integers from free text like "40-80 characters".
fn extract_range(text: &str) -> Option<(usize, usize)> {
    let re = Regex::new(r"\d+").ok()?;
    let mut numbers = re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<usize>().ok());
    let first = numbers.next()?;
    let second = numbers.next()?;
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_extraction_reads_first_two_integers() {
        assert_eq!(extract_range("40-80 characters"), Some((40, 80)));
        assert_eq!(extract_range("between 125 and 150 chars"), Some((125, 150)));
        assert_eq!(extract_range("short"), None);
        assert_eq!(extract_range("only 42"), None);
    }
}
