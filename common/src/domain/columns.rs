use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::Serialize;

use crate::domain::visibility::TimeField;
use crate::{
    EXPIRED_AT_COLUMN_NAME, PUBLICATION_STATUS_COLUMN_NAME, PUBLISHED_AT_COLUMN_NAME,
    PUBLISHED_FIRST_AT_COLUMN_NAME,
};

// Unquoted SQL identifiers only; anything fancier must be renamed upstream.
static VALID_IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier regex must be valid")
});

/// Name of one column of a publishable entity's table.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 63, regex = VALID_IDENTIFIER_REGEX),
    derive(
        Clone, Debug, Display, FromStr, AsRef, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize
    )
)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// Name of a publishable entity's table.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 63, regex = VALID_IDENTIFIER_REGEX),
    derive(
        Clone, Debug, Display, FromStr, AsRef, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize
    )
)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// Per-entity-type names of the four publication columns, supplied once at
/// registration. Each is independently renameable; the defaults follow the
/// schema surface (`publication_status`, `published_first_at`,
/// `published_at`, `expired_at`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicationColumns {
    pub status: ColumnName,
    pub published_first_at: ColumnName,
    pub published_at: ColumnName,
    pub expired_at: ColumnName,
}

impl Default for PublicationColumns {
    fn default() -> Self {
        Self {
            status: ColumnName::try_new(PUBLICATION_STATUS_COLUMN_NAME)
                .expect("default status column name must be valid"),
            published_first_at: ColumnName::try_new(PUBLISHED_FIRST_AT_COLUMN_NAME)
                .expect("default published_first_at column name must be valid"),
            published_at: ColumnName::try_new(PUBLISHED_AT_COLUMN_NAME)
                .expect("default published_at column name must be valid"),
            expired_at: ColumnName::try_new(EXPIRED_AT_COLUMN_NAME)
                .expect("default expired_at column name must be valid"),
        }
    }
}

impl PublicationColumns {
    pub fn with_status(mut self, name: ColumnName) -> Self {
        self.status = name;
        self
    }

    pub fn with_published_first_at(mut self, name: ColumnName) -> Self {
        self.published_first_at = name;
        self
    }

    pub fn with_published_at(mut self, name: ColumnName) -> Self {
        self.published_at = name;
        self
    }

    pub fn with_expired_at(mut self, name: ColumnName) -> Self {
        self.expired_at = name;
        self
    }

    /// Column holding the given window bound.
    pub fn for_field(&self, field: TimeField) -> &ColumnName {
        match field {
            TimeField::PublishedAt => &self.published_at,
            TimeField::ExpiredAt => &self.expired_at,
        }
    }
}
