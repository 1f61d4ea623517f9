//! Publication status shared by posts and post versions.
//!
//! A version is stored with one of these values. A post has no status
//! column of its own: it is `published` when any of its versions is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Published,
}

impl PublicationStatus {
    /// Convert to the string stored in `post_versions.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = CoreError;

    /// Parse a status string. Surrounding whitespace and case are ignored so
    /// query strings like `?status=Published` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(CoreError::Validation(format!(
                "Invalid status '{s}'. Must be one of: draft, published"
            ))),
        }
    }
}

impl TryFrom<String> for PublicationStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("draft".parse::<PublicationStatus>().unwrap(), PublicationStatus::Draft);
        assert_eq!(
            " Published ".parse::<PublicationStatus>().unwrap(),
            PublicationStatus::Published
        );
    }

    #[test]
    fn test_parse_unknown_value_is_validation_error() {
        assert_matches!(
            "archived".parse::<PublicationStatus>(),
            Err(CoreError::Validation(msg)) if msg.contains("archived")
        );
    }

    #[test]
    fn test_as_str_round_trips_through_try_from() {
        for status in [PublicationStatus::Draft, PublicationStatus::Published] {
            let parsed = PublicationStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
