use std::borrow::Cow;

use publishable_common::VisibilityExpr;

use crate::query::{Condition, ConditionValue};
use crate::schema::PublicationColumnRefs;

/// Visibility filter of one listing query.
///
/// An explicit, per-query configuration object rather than an ambient
/// always-on filter: callers state what they want, and tests never depend on
/// hidden global state. The default narrows to the rows
/// [`publishable_common::Publication::is_published`] would accept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityScope {
    /// All rows, drafts and withdrawn ones included.
    WithNotPublished,

    /// Only rows currently visible.
    #[default]
    WithoutNotPublished,

    /// Exact complement of [`VisibilityScope::WithoutNotPublished`].
    OnlyNotPublished,

    /// Rows that never had a publication.
    OnlyDrafted,

    /// Withdrawn rows, plus scheduled ones whose window already closed.
    OnlyExpired,

    /// Scheduled rows whose window opens strictly in the future.
    OnlyWillBePublished,
}

impl VisibilityScope {
    /// The declarative expression this scope compiles from; shared with the
    /// instance-level accessors.
    pub fn expression(&self) -> VisibilityExpr {
        match self {
            VisibilityScope::WithNotPublished => VisibilityExpr::everything(),
            VisibilityScope::WithoutNotPublished => VisibilityExpr::visible(),
            VisibilityScope::OnlyNotPublished => VisibilityExpr::not_visible(),
            VisibilityScope::OnlyDrafted => VisibilityExpr::drafted(),
            VisibilityScope::OnlyExpired => VisibilityExpr::expired(),
            VisibilityScope::OnlyWillBePublished => VisibilityExpr::upcoming(),
        }
    }

    /// Compile to a SQL condition over the qualified columns; `None` when the
    /// scope does not narrow the row set.
    pub fn condition<'a>(&self, columns: &'a PublicationColumnRefs<'a>) -> Option<Condition<'a>> {
        match self {
            VisibilityScope::WithNotPublished => None,
            _ => Some(compile(&self.expression(), columns)),
        }
    }
}

/// Compile a visibility expression into a SQL condition, resolving fields
/// through the entity's (possibly renamed, join-qualified) columns.
pub fn compile<'a>(
    expr: &VisibilityExpr,
    columns: &'a PublicationColumnRefs<'a>,
) -> Condition<'a> {
    match expr {
        VisibilityExpr::Always => Condition::All(vec![]),
        VisibilityExpr::StatusIs(status) => Condition::Equals {
            column: Cow::Borrowed(&columns.status),
            value: ConditionValue::Status(*status),
        },
        VisibilityExpr::StatusIn(statuses) => Condition::In {
            column: Cow::Borrowed(&columns.status),
            values: statuses
                .iter()
                .map(|status| ConditionValue::Status(*status))
                .collect(),
        },
        VisibilityExpr::IsNull(field) => Condition::IsNull {
            column: Cow::Borrowed(columns.for_field(*field)),
        },
        VisibilityExpr::IsNotNull(field) => Condition::IsNotNull {
            column: Cow::Borrowed(columns.for_field(*field)),
        },
        VisibilityExpr::OnOrBeforeNow(field) => Condition::OnOrBeforeNow {
            column: Cow::Borrowed(columns.for_field(*field)),
        },
        VisibilityExpr::AfterNow(field) => Condition::AfterNow {
            column: Cow::Borrowed(columns.for_field(*field)),
        },
        VisibilityExpr::All(parts) => {
            Condition::All(parts.iter().map(|part| compile(part, columns)).collect())
        }
        VisibilityExpr::Any(parts) => {
            Condition::Any(parts.iter().map(|part| compile(part, columns)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use publishable_common::{ColumnName, PublicationColumns, PublicationStatus, test_utils};

    use super::*;

    fn render(scope: VisibilityScope, columns: &PublicationColumns) -> Option<String> {
        let refs = PublicationColumnRefs::new(columns, "m");
        scope.condition(&refs).map(|condition| {
            let mut counter = 1;
            condition.to_sql(&mut counter).0
        })
    }

    #[test]
    fn default_scope_is_the_visible_filter() {
        let columns = PublicationColumns::default();
        let sql = render(VisibilityScope::default(), &columns).unwrap();

        assert_eq!(
            sql,
            "(\"m\".\"publication_status\" = $1 OR \
             (\"m\".\"publication_status\" = $2 AND \
             \"m\".\"published_at\" IS NOT NULL AND \
             \"m\".\"published_at\" <= now() AND \
             (\"m\".\"expired_at\" IS NULL OR \"m\".\"expired_at\" > now())))"
        );
    }

    #[test]
    fn with_not_published_does_not_narrow_the_query() {
        let columns = PublicationColumns::default();
        assert_eq!(render(VisibilityScope::WithNotPublished, &columns), None);
    }

    #[test]
    fn only_not_published_covers_the_three_hidden_shapes() {
        let columns = PublicationColumns::default();
        let sql = render(VisibilityScope::OnlyNotPublished, &columns).unwrap();

        assert_eq!(
            sql,
            "(\"m\".\"publication_status\" IN ($1, $2) OR \
             (\"m\".\"publication_status\" = $3 AND \
             (\"m\".\"published_at\" IS NULL OR \
             \"m\".\"published_at\" > now() OR \
             (\"m\".\"expired_at\" IS NOT NULL AND \"m\".\"expired_at\" <= now()))))"
        );
    }

    #[test]
    fn narrow_scopes_compile_to_their_predicates() {
        let columns = PublicationColumns::default();

        assert_eq!(
            render(VisibilityScope::OnlyDrafted, &columns).unwrap(),
            "\"m\".\"publication_status\" = $1"
        );
        assert_eq!(
            render(VisibilityScope::OnlyExpired, &columns).unwrap(),
            "(\"m\".\"publication_status\" = $1 OR \
             (\"m\".\"publication_status\" = $2 AND \
             \"m\".\"expired_at\" IS NOT NULL AND \
             \"m\".\"expired_at\" <= now()))"
        );
        assert_eq!(
            render(VisibilityScope::OnlyWillBePublished, &columns).unwrap(),
            "(\"m\".\"publication_status\" = $1 AND \
             \"m\".\"published_at\" IS NOT NULL AND \
             \"m\".\"published_at\" > now())"
        );
    }

    /// Each scope must select exactly the rows the instance accessors would
    /// classify the same way at the same instant.
    #[test]
    fn scopes_agree_with_the_instance_accessors() {
        let now = Utc::now();

        for publication in test_utils::census(now) {
            let visible = publication.is_published(now);

            assert_eq!(
                VisibilityScope::WithoutNotPublished
                    .expression()
                    .evaluate(&publication, now),
                visible
            );
            assert_eq!(
                VisibilityScope::OnlyNotPublished
                    .expression()
                    .evaluate(&publication, now),
                !visible
            );
            assert_eq!(
                VisibilityScope::OnlyWillBePublished
                    .expression()
                    .evaluate(&publication, now),
                publication.status == PublicationStatus::Scheduled
                    && publication.will_be_published(now)
            );
        }
    }

    /// The canonical eight-record census: default filter keeps 3, the
    /// complement keeps the other 5, and the narrow scopes split those 5
    /// into 2 drafts, 2 expired, 1 upcoming.
    #[test]
    fn census_counts_per_scope() {
        let now = Utc::now();
        let census = test_utils::census(now);

        let count = |scope: VisibilityScope| {
            census
                .iter()
                .filter(|publication| scope.expression().evaluate(publication, now))
                .count()
        };

        assert_eq!(count(VisibilityScope::WithNotPublished), 8);
        assert_eq!(count(VisibilityScope::WithoutNotPublished), 3);
        assert_eq!(count(VisibilityScope::OnlyNotPublished), 5);
        assert_eq!(count(VisibilityScope::OnlyDrafted), 2);
        assert_eq!(count(VisibilityScope::OnlyExpired), 2);
        assert_eq!(count(VisibilityScope::OnlyWillBePublished), 1);
    }

    /// drafted, expired, upcoming and visible are pairwise disjoint and
    /// together cover the whole row set.
    #[test]
    fn narrow_scopes_partition_the_row_set() {
        let now = Utc::now();
        let partition = [
            VisibilityScope::OnlyDrafted,
            VisibilityScope::OnlyExpired,
            VisibilityScope::OnlyWillBePublished,
            VisibilityScope::WithoutNotPublished,
        ];

        for publication in test_utils::census(now) {
            let matches = partition
                .iter()
                .filter(|scope| scope.expression().evaluate(&publication, now))
                .count();
            assert_eq!(matches, 1, "not exactly one class for {:?}", publication);
        }
    }

    #[test]
    fn renamed_columns_flow_into_the_compiled_predicate() {
        let columns = PublicationColumns::default()
            .with_status(ColumnName::try_new("state").unwrap())
            .with_expired_at(ColumnName::try_new("visible_until").unwrap());
        let sql = render(VisibilityScope::OnlyExpired, &columns).unwrap();

        assert!(sql.contains("\"m\".\"state\" = $1"));
        assert!(sql.contains("\"m\".\"visible_until\" <= now()"));
        assert!(!sql.contains("expired_at"));
    }
}
