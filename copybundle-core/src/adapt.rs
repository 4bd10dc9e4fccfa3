//! Per-platform copy adaptation: normalize, optionally append a
//! call-to-action, then trim to the platform's resolved constraints.
//!
//! All platforms share one trim primitive. Reddit is special-cased: its
//! title is derived from the first sentence and its body is only
//! hard-capped, never soft-trimmed.

use regex::Regex;
use tracing::debug;

use crate::constraints::{
    ConstraintSet, Platform, PlatformLimits, REDDIT_BODY_MAX, REDDIT_TITLE_MAX,
};
use crate::normalize::{char_len, normalize, truncate_chars};

const ELLIPSIS: &str = "...";

/// Adapted single-field copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapted {
    pub text: String,
    pub was_trimmed: bool,
}

/// Adapted reddit post: separate title and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditPost {
    pub title: String,
    pub body: String,
    pub was_trimmed: bool,
}

/// Output of [`adapt`], shaped per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCopy {
    Single(Adapted),
    Reddit(RedditPost),
}

impl PlatformCopy {
    pub fn was_trimmed(&self) -> bool {
        match self {
            PlatformCopy::Single(a) => a.was_trimmed,
            PlatformCopy::Reddit(r) => r.was_trimmed,
        }
    }
}

/// Adapt `text` for `platform`.
///
/// The CTA is appended only when both `cta` and `source_href` are present:
/// a call-to-action is never added without somewhere for it to point. CTA
/// insertion happens before the length check by contract, so in-range text
/// plus CTA may end up trimmed.
pub fn adapt(
    platform: Platform,
    text: &str,
    cta: Option<&str>,
    source_href: Option<&str>,
    constraints: &ConstraintSet,
) -> PlatformCopy {
    if platform == Platform::Reddit {
        // Reddit takes no CTA.
        return PlatformCopy::Reddit(adapt_reddit(text));
    }

    let mut copy = normalize(text);
    if let (Some(cta), Some(_href)) = (cta, source_href) {
        copy.push(' ');
        copy.push_str(cta);
    }

    let limits = constraints.resolve(platform);
    PlatformCopy::Single(trim_to_limits(&copy, &limits))
}

/// Shared trim primitive.
///
/// Text at or below the soft cap is returned untouched (the target window is
/// advisory; copy between `target_max` and `soft_cap`, or below `target_min`,
/// is not altered). Above the soft cap the text is trimmed to
/// `soft_cap - 3` characters plus an ellipsis, then hard-truncated to
/// `hard_cap` if still over. When `soft_cap == hard_cap` there is no soft
/// tier and excess is truncated in one step, no ellipsis.
pub fn trim_to_limits(text: &str, limits: &PlatformLimits) -> Adapted {
    let len = char_len(text);
    if len <= limits.soft_cap {
        return Adapted {
            text: text.to_string(),
            was_trimmed: false,
        };
    }

    let trimmed = if limits.soft_cap == limits.hard_cap {
        truncate_chars(text, limits.hard_cap)
    } else {
        let mut t = truncate_chars(text, limits.soft_cap.saturating_sub(ELLIPSIS.len()));
        t.push_str(ELLIPSIS);
        if char_len(&t) > limits.hard_cap {
            t = truncate_chars(&t, limits.hard_cap);
        }
        t
    };

    debug!(
        original_len = len,
        final_len = char_len(&trimmed),
        soft_cap = limits.soft_cap,
        hard_cap = limits.hard_cap,
        "trimmed copy to platform limits"
    );
    Adapted {
        text: trimmed,
        was_trimmed: true,
    }
}

/// Phrasings that begin a call-to-action clause; stripped from reddit
/// titles wherever they appear in the chosen sentence.
const CTA_OPENERS: [&str; 6] = [
    "learn more",
    "read more",
    "check out",
    "sign up",
    "join us",
    "click",
];

/// Derive a reddit post from text: title from the first real sentence
/// (hashtags and call-to-action clauses stripped), body as the normalized
/// full text hard-capped at 10,000 characters.
pub fn adapt_reddit(text: &str) -> RedditPost {
    let body_full = normalize(text);
    let mut was_trimmed = false;

    let body = if char_len(&body_full) > REDDIT_BODY_MAX {
        was_trimmed = true;
        truncate_chars(&body_full, REDDIT_BODY_MAX)
    } else {
        body_full.clone()
    };

    let title_source = strip_hashtags(&body_full);
    let mut title = title_source
        .split(['.', '!', '?'])
        .map(strip_cta)
        .find(|sentence| !sentence.is_empty())
        .unwrap_or_default();

    if char_len(&title) > REDDIT_TITLE_MAX {
        was_trimmed = true;
        title = truncate_chars(&title, REDDIT_TITLE_MAX - ELLIPSIS.len());
        title.push_str(ELLIPSIS);
    }

    RedditPost {
        title,
        body,
        was_trimmed,
    }
}

fn strip_hashtags(text: &str) -> String {
    // Compiled per call; adaptation batches are tens of items.
    match Regex::new(r"#\w+") {
        Ok(re) => re.replace_all(text, "").trim().to_string(),
        Err(_) => text.to_string(),
    }
}

/// Remove CTA material from a candidate title sentence: placeholder tokens
/// anywhere, and everything from a CTA opener to the end of the sentence. A
/// sentence that was nothing but CTA strips down to empty and is skipped.
fn strip_cta(sentence: &str) -> String {
    let mut text = match Regex::new(r"\[CTA[_A-Z]*\]") {
        Ok(re) => re.replace_all(sentence, "").to_string(),
        Err(_) => sentence.to_string(),
    };
    let openers = CTA_OPENERS.join("|");
    if let Ok(re) = Regex::new(&format!(r"(?is)\b({openers})\b.*$")) {
        text = re.replace(&text, "").to_string();
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches([',', ':', ';']).trim_end().to_string()
}
