use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Caller-facing lifecycle tag of a publishable entity.
///
/// Stored as lowercase text. `Draft` is the state of every newly created
/// entity; `Unpublished` is never chosen by callers directly, the save-time
/// normalization assigns it to withdrawn entities that have a publication
/// history (see [`crate::Publication::normalize`]).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Published,
    Unpublished,
    Scheduled,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
            PublicationStatus::Unpublished => "unpublished",
            PublicationStatus::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that is none of the four known tags.
///
/// Raised at the data-binding boundary only; the lifecycle functions
/// themselves are total and never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown publication status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for PublicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PublicationStatus::Draft),
            "published" => Ok(PublicationStatus::Published),
            "unpublished" => Ok(PublicationStatus::Unpublished),
            "scheduled" => Ok(PublicationStatus::Scheduled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_draft() {
        assert_eq!(PublicationStatus::default(), PublicationStatus::Draft);
    }

    #[test]
    fn serializes_as_lowercase_text() {
        let json = serde_json::to_string(&PublicationStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
    }

    #[test]
    fn parses_known_tags_and_rejects_others() {
        assert_eq!(
            "unpublished".parse::<PublicationStatus>().unwrap(),
            PublicationStatus::Unpublished
        );
        let err = "archived".parse::<PublicationStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("archived".to_owned()));
    }
}
