use regex::Regex;
use std::sync::LazyLock;

static CANONICAL_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator regex"));

/// Values that leak into slug fields from broken imports
const PLACEHOLDER_SLUGS: [&str; 3] = ["undefined", "null", "nan"];

/// Build a URL slug from free text: lowercase ASCII alphanumerics joined by single hyphens
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

pub fn is_canonical_slug(slug: &str) -> bool {
    CANONICAL_SLUG.is_match(slug)
}

/// Whether a stored slug may appear in a public URL
pub fn is_publishable_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !PLACEHOLDER_SLUGS.contains(&slug.to_ascii_lowercase().as_str())
        && is_canonical_slug(slug)
}

/// Pick `base`, or `base-2`, `base-3`, ... until `taken` says no
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = if base.is_empty() { "untitled" } else { base };
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Normalize a path segment the way legacy links were produced
pub fn normalize_segment(segment: &str) -> String {
    segment.trim_end_matches('/').to_lowercase()
}
