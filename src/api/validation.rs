use regex::Regex;
use std::sync::LazyLock;

use super::ApiError;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let valid = EMAIL_RE.as_ref().is_some_and(|re| re.is_match(trimmed));
    if !valid {
        return Err(ApiError::validation(format!(
            "Invalid email address: {trimmed}"
        )));
    }
    Ok(trimmed)
}

pub fn validate_required<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

pub fn validate_item_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid item ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

/// Public slugs are short lowercase alphanumerics; anything else cannot exist.
pub fn is_plausible_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" ana@example.com ").unwrap(), "ana@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("a na@example.com").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("  x ", "Name").unwrap(), "x");
        assert!(validate_required("   ", "Name").is_err());
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id(1).is_ok());
        assert!(validate_item_id(0).is_err());
        assert!(validate_item_id(-4).is_err());
    }

    #[test]
    fn test_plausible_slug() {
        assert!(is_plausible_slug("abc123xyz0"));
        assert!(!is_plausible_slug(""));
        assert!(!is_plausible_slug("../etc"));
    }
}
