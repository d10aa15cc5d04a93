//! Preset field validation.
//!
//! Covers the business fields submitted alongside an upload: required-field
//! checks, the `<number> KB|MB` size string, and author URL normalization.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateUrl;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
   Field names
   -------------------------------------------------------------------------- */

pub const FIELD_TITLE: &str = "title";
pub const FIELD_SUBTITLE: &str = "subtitle";
pub const FIELD_KATEGORI: &str = "kategori";
pub const FIELD_SIZE: &str = "size";
pub const FIELD_FORMAT: &str = "format";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_AUTHOR_URL: &str = "author_url";

/// Every business field a create request must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    FIELD_TITLE,
    FIELD_SUBTITLE,
    FIELD_KATEGORI,
    FIELD_SIZE,
    FIELD_FORMAT,
    FIELD_TYPE,
    FIELD_AUTHOR_URL,
];

/* --------------------------------------------------------------------------
   Size strings
   -------------------------------------------------------------------------- */

/// Full-match pattern a stored size string must satisfy.
const SIZE_PATTERN: &str = r"(?i)^[0-9]+(\.[0-9]+)?\s*(KB|MB)$";

/// Loose pattern used when converting a stored size to megabytes.
const SIZE_VALUE_PATTERN: &str = r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(KB|MB)";

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SIZE_PATTERN).expect("valid regex"));

static SIZE_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SIZE_VALUE_PATTERN).expect("valid regex"));

pub const SIZE_FORMAT_MESSAGE: &str = "Size must be in format 'number KB' or 'number MB'";

/// Validate a size string such as `"500 KB"` or `"2.5mb"`.
pub fn validate_size(size: &str) -> Result<(), CoreError> {
    if SIZE_RE.is_match(size) {
        Ok(())
    } else {
        Err(CoreError::Validation(SIZE_FORMAT_MESSAGE.to_string()))
    }
}

/// Convert a size string to megabytes (`KB` divided by 1024).
///
/// Strings that carry no recognizable `<number> KB|MB` yield `0.0`, so a
/// malformed record never disappears behind the size filter.
pub fn size_in_mb(size: &str) -> f64 {
    let Some(caps) = SIZE_VALUE_RE.captures(size) else {
        return 0.0;
    };
    let value: f64 = caps[1].parse().unwrap_or(0.0);
    if caps[2].eq_ignore_ascii_case("MB") {
        value
    } else {
        value / 1024.0
    }
}

/* --------------------------------------------------------------------------
   Author URL
   -------------------------------------------------------------------------- */

pub const AUTHOR_URL_MESSAGE: &str = "Author URL must be a valid URL";

/// Prefix `https://` when the value carries no http(s) scheme, then require
/// that the result parses as a URL. Returns the normalized value.
pub fn normalize_author_url(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let normalized = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if normalized.validate_url() {
        Ok(normalized)
    } else {
        Err(CoreError::Validation(AUTHOR_URL_MESSAGE.to_string()))
    }
}

/* --------------------------------------------------------------------------
   Required fields
   -------------------------------------------------------------------------- */

/// A submitted value counts as present only when it is non-blank.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Require a non-blank value for `field`.
pub fn validate_required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("Field '{field}' is required"))),
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */
