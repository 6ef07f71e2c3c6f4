use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::is_canonical_slug;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 500;
pub const CONTENT_MAX: usize = 20_000;
pub const MAX_TAGS: usize = 20;
pub const TAG_MAX: usize = 40;

/// A required text field, trimmed, with a character-count range
pub fn required_text(field: &str, value: Option<&str>, min: usize, max: usize) -> AppResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    let len = value.chars().count();
    if len < min {
        return Err(AppError::Validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

/// Trim, drop blanks, dedupe case-insensitively (first spelling wins), then bound count and length
pub fn normalize_tags(tags: Vec<String>) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > TAG_MAX {
            return Err(AppError::Validation(format!(
                "Tag '{}' exceeds {} characters",
                tag, TAG_MAX
            )));
        }
        if !normalized.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            normalized.push(tag.to_string());
        }
    }
    if normalized.len() > MAX_TAGS {
        return Err(AppError::Validation(format!("At most {} tags are allowed", MAX_TAGS)));
    }
    Ok(normalized)
}

/// Explicit slugs must already be canonical; they are never rewritten silently
pub fn explicit_slug(slug: &str) -> AppResult<String> {
    let slug = slug.trim();
    if !is_canonical_slug(slug) {
        return Err(AppError::Validation(format!(
            "Slug '{}' must contain only lowercase letters, digits and single hyphens",
            slug
        )));
    }
    Ok(slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Title", Some("  Hello  "), 3, 10).unwrap(), "Hello");
        assert!(matches!(required_text("Title", None, 3, 10), Err(AppError::Validation(m)) if m == "Title is required"));
        assert!(required_text("Title", Some("   "), 3, 10).is_err());
        assert!(required_text("Title", Some("ab"), 3, 10).is_err());
        assert!(required_text("Title", Some("abcdefghijk"), 3, 10).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("Description", None, 5).unwrap(), "");
        assert!(optional_text("Description", Some("too long"), 5).is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![" rust ".into(), "".into(), "Rust".into(), "async".into()]).unwrap();
        assert_eq!(tags, vec!["rust", "async"]);

        let too_many: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{}", i)).collect();
        assert!(normalize_tags(too_many).is_err());
        assert!(normalize_tags(vec!["x".repeat(TAG_MAX + 1)]).is_err());
    }

    #[test]
    fn test_explicit_slug() {
        assert_eq!(explicit_slug(" code-review ").unwrap(), "code-review");
        assert!(explicit_slug("Code Review").is_err());
    }
}
