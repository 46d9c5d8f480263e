use chrono::{DateTime, Utc};

use crate::domain::publication::Publication;
use crate::domain::status::PublicationStatus;

/// Which of the two window-bound columns a comparison refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeField {
    PublishedAt,
    ExpiredAt,
}

impl TimeField {
    pub fn read(&self, publication: &Publication) -> Option<DateTime<Utc>> {
        match self {
            TimeField::PublishedAt => publication.published_at,
            TimeField::ExpiredAt => publication.expired_at,
        }
    }
}

/// Declarative predicate over the status column and the two window bounds.
///
/// One description, two call shapes: [`VisibilityExpr::evaluate`] answers the
/// question for a loaded instance against an explicit `now`, while the
/// persistence crate compiles the same tree into SQL conditions evaluated
/// against the database's `now()`. A single source keeps the accessor and the
/// query filter from drifting apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisibilityExpr {
    /// Matches every row.
    Always,

    /// status = tag
    StatusIs(PublicationStatus),

    /// status IN (tags)
    StatusIn(Vec<PublicationStatus>),

    /// field IS NULL
    IsNull(TimeField),

    /// field IS NOT NULL
    IsNotNull(TimeField),

    /// field <= now; false when the field is null
    OnOrBeforeNow(TimeField),

    /// field > now; false when the field is null
    AfterNow(TimeField),

    /// Every part matches (AND)
    All(Vec<VisibilityExpr>),

    /// At least one part matches (OR)
    Any(Vec<VisibilityExpr>),
}

impl VisibilityExpr {
    /// Rows effectively visible at the evaluation instant: published, or
    /// scheduled with an open window. Lower bound inclusive, upper bound
    /// exclusive.
    pub fn visible() -> VisibilityExpr {
        VisibilityExpr::Any(vec![
            VisibilityExpr::StatusIs(PublicationStatus::Published),
            VisibilityExpr::All(vec![
                VisibilityExpr::StatusIs(PublicationStatus::Scheduled),
                VisibilityExpr::IsNotNull(TimeField::PublishedAt),
                VisibilityExpr::OnOrBeforeNow(TimeField::PublishedAt),
                VisibilityExpr::Any(vec![
                    VisibilityExpr::IsNull(TimeField::ExpiredAt),
                    VisibilityExpr::AfterNow(TimeField::ExpiredAt),
                ]),
            ]),
        ])
    }

    /// Complement of [`VisibilityExpr::visible`]: drafts, withdrawn rows, and
    /// scheduled rows whose window is not currently open.
    pub fn not_visible() -> VisibilityExpr {
        VisibilityExpr::Any(vec![
            VisibilityExpr::StatusIn(vec![
                PublicationStatus::Draft,
                PublicationStatus::Unpublished,
            ]),
            VisibilityExpr::All(vec![
                VisibilityExpr::StatusIs(PublicationStatus::Scheduled),
                VisibilityExpr::Any(vec![
                    VisibilityExpr::IsNull(TimeField::PublishedAt),
                    VisibilityExpr::AfterNow(TimeField::PublishedAt),
                    VisibilityExpr::All(vec![
                        VisibilityExpr::IsNotNull(TimeField::ExpiredAt),
                        VisibilityExpr::OnOrBeforeNow(TimeField::ExpiredAt),
                    ]),
                ]),
            ]),
        ])
    }

    /// Rows that never had a publication: status = draft.
    pub fn drafted() -> VisibilityExpr {
        VisibilityExpr::StatusIs(PublicationStatus::Draft)
    }

    /// Rows whose visibility ended: withdrawn, or scheduled with an elapsed
    /// upper bound.
    pub fn expired() -> VisibilityExpr {
        VisibilityExpr::Any(vec![
            VisibilityExpr::StatusIs(PublicationStatus::Unpublished),
            VisibilityExpr::All(vec![
                VisibilityExpr::StatusIs(PublicationStatus::Scheduled),
                VisibilityExpr::IsNotNull(TimeField::ExpiredAt),
                VisibilityExpr::OnOrBeforeNow(TimeField::ExpiredAt),
            ]),
        ])
    }

    /// Scheduled rows whose window opens strictly in the future.
    pub fn upcoming() -> VisibilityExpr {
        VisibilityExpr::All(vec![
            VisibilityExpr::StatusIs(PublicationStatus::Scheduled),
            VisibilityExpr::IsNotNull(TimeField::PublishedAt),
            VisibilityExpr::AfterNow(TimeField::PublishedAt),
        ])
    }

    /// No narrowing at all.
    pub fn everything() -> VisibilityExpr {
        VisibilityExpr::Always
    }

    /// Interpret the tree against a loaded instance at the given instant.
    ///
    /// Null comparison semantics match SQL: a `<=`/`>` test on a null field
    /// is false, which degrades malformed rows (scheduled without a lower
    /// bound) to the conservative not-visible classification.
    pub fn evaluate(&self, publication: &Publication, now: DateTime<Utc>) -> bool {
        match self {
            VisibilityExpr::Always => true,
            VisibilityExpr::StatusIs(status) => publication.status == *status,
            VisibilityExpr::StatusIn(statuses) => statuses.contains(&publication.status),
            VisibilityExpr::IsNull(field) => field.read(publication).is_none(),
            VisibilityExpr::IsNotNull(field) => field.read(publication).is_some(),
            VisibilityExpr::OnOrBeforeNow(field) => {
                field.read(publication).is_some_and(|at| at <= now)
            }
            VisibilityExpr::AfterNow(field) => field.read(publication).is_some_and(|at| at > now),
            VisibilityExpr::All(parts) => parts.iter().all(|part| part.evaluate(publication, now)),
            VisibilityExpr::Any(parts) => parts.iter().any(|part| part.evaluate(publication, now)),
        }
    }
}
