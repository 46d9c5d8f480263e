mod domain;

// Persisted publication state column names.
// These are the defaults; every publishable entity type may rename any of
// the four columns independently (see `PublicationColumns`).

pub const PUBLICATION_STATUS_COLUMN_NAME: &'static str = "publication_status";
pub const PUBLISHED_FIRST_AT_COLUMN_NAME: &'static str = "published_first_at";
pub const PUBLISHED_AT_COLUMN_NAME: &'static str = "published_at";
pub const EXPIRED_AT_COLUMN_NAME: &'static str = "expired_at";

// expose domain module

pub use domain::*;

// fixtures reused by the persistence crate tests

pub mod test_utils;
