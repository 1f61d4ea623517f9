//! Tag name normalization and validation.
//!
//! Tag names are stored normalized (trimmed, lowercased) so that
//! `"  GoLang "` and `"golang"` refer to the same row.

use crate::error::CoreError;

/// Minimum length of a normalized tag name, in characters.
pub const TAG_NAME_MIN_LEN: usize = 2;

/// Maximum length of a normalized tag name, in characters.
pub const TAG_NAME_MAX_LEN: usize = 50;

/// Maximum length of a tag description, in characters.
pub const TAG_DESCRIPTION_MAX_LEN: usize = 500;

/// Normalize a tag name: trim surrounding whitespace and lowercase.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a list of tag names, dropping empties and collapsing duplicates.
///
/// First-seen order is preserved.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let normalized = normalize_tag_name(name.as_ref());
        if normalized.is_empty() || out.contains(&normalized) {
            continue;
        }
        out.push(normalized);
    }
    out
}

/// Split a comma-separated `?tags=` query value into normalized names.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let parts: Vec<&str> = raw.split(',').collect();
    normalize_tag_names(&parts)
}

/// Validate an already-normalized tag name.
pub fn validate_tag_name(name: &str) -> Result<(), CoreError> {
    let len = name.chars().count();
    if !(TAG_NAME_MIN_LEN..=TAG_NAME_MAX_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Tag name must be between {TAG_NAME_MIN_LEN} and {TAG_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_tag_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > TAG_DESCRIPTION_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Tag description must be at most {TAG_DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Escape `LIKE` wildcards so user input only matches literally.
///
/// Pair with `ESCAPE '\'` in the SQL.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
