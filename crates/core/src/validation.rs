//! Field validation helpers used alongside `validator` derives.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;

/// Maximum slug length, in characters.
pub const SLUG_MAX_LEN: usize = 255;

/// A slug is lowercase ASCII letters, digits and single hyphens between
/// them, e.g. `my-first-post`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= SLUG_MAX_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some(Cow::Borrowed(
            "must contain only lowercase letters, digits and single hyphens",
        ));
        Err(err)
    }
}

/// Reject strings that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be blank"));
        return Err(err);
    }
    Ok(())
}

impl From<ValidationErrors> for CoreError {
    /// Flatten field errors into one message, ordered by field name.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None => format!("failed '{}' check", e.code),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{field}: {detail}")
            })
            .collect();
        fields.sort();
        CoreError::Validation(fields.join("; "))
    }
}
