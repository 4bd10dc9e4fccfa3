use copybundle_core::adapt::{adapt, adapt_reddit, trim_to_limits, PlatformCopy};
use copybundle_core::constraints::{ConstraintSet, Platform, PLATFORM_ORDER};
use copybundle_core::normalize::char_len;

fn constraints() -> ConstraintSet {
    ConstraintSet::default()
}

fn single(copy: PlatformCopy) -> (String, bool) {
    match copy {
        PlatformCopy::Single(a) => (a.text, a.was_trimmed),
        PlatformCopy::Reddit(_) => panic!("expected single-field copy"),
    }
}

#[test]
fn in_range_text_is_returned_unchanged() {
    let set = constraints();
    // 60 chars, inside facebook's 40-80 target window.
    let text = "a".repeat(60);
    let (out, trimmed) = single(adapt(Platform::Facebook, &text, None, None, &set));
    assert_eq!(out, text);
    assert!(!trimmed);
}

#[test]
fn output_never_exceeds_hard_cap_on_any_platform() {
    let set = constraints();
    let long = "word ".repeat(3000);
    for platform in PLATFORM_ORDER {
        let limits = set.resolve(platform);
        match adapt(platform, &long, None, None, &set) {
            PlatformCopy::Single(a) => {
                assert!(
                    char_len(&a.text) <= limits.hard_cap,
                    "{platform}: {} > {}",
                    char_len(&a.text),
                    limits.hard_cap
                );
                assert!(a.was_trimmed);
            }
            PlatformCopy::Reddit(post) => {
                assert!(char_len(&post.title) <= 140);
                assert!(char_len(&post.body) <= 10_000);
            }
        }
    }
}

#[test]
fn soft_trim_appends_ellipsis_at_soft_cap() {
    let set = constraints();
    // Above facebook's soft cap of 120.
    let text = "b".repeat(200);
    let (out, trimmed) = single(adapt(Platform::Facebook, &text, None, None, &set));
    assert!(trimmed);
    assert_eq!(char_len(&out), 120);
    assert!(out.ends_with("..."));
}

#[test]
fn twitter_excess_is_truncated_to_exactly_280_in_one_step() {
    let set = constraints();
    let text = "c".repeat(400);
    let (out, trimmed) = single(adapt(Platform::Twitter, &text, None, None, &set));
    assert!(trimmed);
    assert_eq!(char_len(&out), 280);
    // No soft tier on twitter: no ellipsis marker.
    assert!(!out.ends_with("..."));
}

#[test]
fn cta_requires_a_source_link() {
    let set = constraints();
    let (out, trimmed) = single(adapt(Platform::Facebook, "Short msg", Some("[CTA]"), None, &set));
    assert_eq!(out, "Short msg");
    assert!(!trimmed);

    let (out, _) = single(adapt(
        Platform::Facebook,
        "Short msg",
        Some("[CTA]"),
        Some("http://x"),
        &set,
    ));
    assert_eq!(out, "Short msg [CTA]");
}

#[test]
fn cta_insertion_precedes_the_length_check() {
    let set = constraints();
    // 110 chars is under facebook's soft cap, but the CTA pushes it over.
    let text = "d".repeat(110);
    let cta = "Tap the link in our bio to learn more today";
    let (out, trimmed) = single(adapt(
        Platform::Facebook,
        &text,
        Some(cta),
        Some("http://x"),
        &set,
    ));
    assert!(trimmed);
    assert_eq!(char_len(&out), 120);
}

#[test]
fn reddit_title_excludes_hashtags_and_cta_clauses() {
    let post = adapt_reddit("Great tip! Learn more: http://x.com #Safety");
    assert_eq!(post.title, "Great tip");
    assert!(char_len(&post.title) <= 140);
    assert!(post.body.contains("Great tip!"));
}

#[test]
fn reddit_title_drops_inline_cta_clauses() {
    let post = adapt_reddit("Winter tires help a lot, learn more at our site. Stay warm out there");
    assert_eq!(post.title, "Winter tires help a lot");
}

#[test]
fn reddit_title_drops_embedded_cta_placeholder() {
    let post = adapt_reddit("Stay safe out there [CTA_PLACEHOLDER] this season. More below");
    assert_eq!(post.title, "Stay safe out there this season");
}

#[test]
fn reddit_takes_no_cta_and_caps_title_at_140() {
    let long_sentence = "e".repeat(300);
    match adapt(
        Platform::Reddit,
        &long_sentence,
        Some("[CTA]"),
        Some("http://x"),
        &constraints(),
    ) {
        PlatformCopy::Reddit(post) => {
            assert!(!post.body.contains("[CTA]"));
            assert_eq!(char_len(&post.title), 140);
            assert!(post.title.ends_with("..."));
            assert!(post.was_trimmed);
        }
        PlatformCopy::Single(_) => panic!("reddit must produce title/body"),
    }
}

#[test]
fn reddit_body_is_hard_capped_at_10000() {
    let huge = "f".repeat(12_000);
    let post = adapt_reddit(&huge);
    assert_eq!(char_len(&post.body), 10_000);
    assert!(post.was_trimmed);
}

#[test]
fn trim_primitive_leaves_text_between_target_and_soft_cap_alone() {
    let set = constraints();
    let limits = set.resolve(Platform::Facebook);
    // 100 chars: above target_max (80) but under soft_cap (120).
    let text = "g".repeat(100);
    let out = trim_to_limits(&text, &limits);
    assert_eq!(out.text, text);
    assert!(!out.was_trimmed);
}
