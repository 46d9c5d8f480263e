use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use publishable_common::{ColumnName, Publication, PublicationColumns, TableName};

use crate::database::Database;
use crate::query::{Condition, ConditionValue, OrderBy, QueryBuilder, SortDirection, SqlParameter};
use crate::schema::{Column, ColumnRef, PublicationColumnRefs, Table};
use crate::scopes::VisibilityScope;

/// Registration of one publishable entity type: its table, its id column,
/// and the (possibly renamed) publication columns. The SQL text for the
/// table's statements lives here, independent of any connection pool.
#[derive(Clone, Debug)]
pub struct PublishableEntity {
    pub table: TableName,
    pub id_column: ColumnName,
    pub columns: PublicationColumns,
}

impl PublishableEntity {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            id_column: ColumnName::try_new("id").expect("default id column name must be valid"),
            columns: PublicationColumns::default(),
        }
    }

    pub fn with_id_column(mut self, id_column: ColumnName) -> Self {
        self.id_column = id_column;
        self
    }

    pub fn with_columns(mut self, columns: PublicationColumns) -> Self {
        self.columns = columns;
        self
    }

    fn id_column(&self) -> Column<'_> {
        Column {
            qualifier: MAIN_ALIAS,
            name: self.id_column.as_str(),
        }
    }

    fn selected_columns<'a>(
        id_column: &'a Column<'a>,
        columns: &'a PublicationColumnRefs<'a>,
    ) -> Vec<ColumnRef<'a>> {
        vec![
            Cow::Borrowed(id_column),
            Cow::Borrowed(&columns.status),
            Cow::Borrowed(&columns.published_first_at),
            Cow::Borrowed(&columns.published_at),
            Cow::Borrowed(&columns.expired_at),
        ]
    }

    /// SELECT of id plus the four publication columns, narrowed by the scope.
    fn listing_query(&self, scope: VisibilityScope) -> (String, Vec<SqlParameter>) {
        let id_column = self.id_column();
        let columns = PublicationColumnRefs::new(&self.columns, MAIN_ALIAS);

        let mut builder = QueryBuilder::from(Table::from(&self.table))
            .select(Self::selected_columns(&id_column, &columns))
            .order_by(OrderBy {
                column: Cow::Borrowed(&id_column),
                direction: SortDirection::Ascending,
            });

        if let Some(condition) = scope.condition(&columns) {
            builder = builder.where_condition(condition);
        }

        builder.build()
    }

    fn update_sql(&self) -> String {
        let columns = &self.columns;
        format!(
            "UPDATE \"{}\" SET \"{}\" = $1, \"{}\" = $2, \"{}\" = $3, \"{}\" = $4 WHERE \"{}\" = $5",
            self.table.as_str(),
            columns.status.as_str(),
            columns.published_first_at.as_str(),
            columns.published_at.as_str(),
            columns.expired_at.as_str(),
            self.id_column.as_str(),
        )
    }

    fn insert_sql(&self) -> String {
        let columns = &self.columns;
        format!(
            "INSERT INTO \"{}\" (\"{}\", \"{}\", \"{}\", \"{}\") VALUES ($1, $2, $3, $4) RETURNING \"{}\"",
            self.table.as_str(),
            columns.status.as_str(),
            columns.published_first_at.as_str(),
            columns.published_at.as_str(),
            columns.expired_at.as_str(),
            self.id_column.as_str(),
        )
    }
}

/// One loaded row: the entity's id plus its publication state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicationRow {
    pub id: i64,
    pub publication: Publication,
}

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    DatabaseError(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NotFound => f.write_str("row not found"),
            RepositoryError::DatabaseError(message) => write!(f, "database error: {}", message),
        }
    }
}

impl std::error::Error for RepositoryError {}

const MAIN_ALIAS: &'static str = "m";

/// Repository over one publishable entity type.
///
/// Every write goes through [`Publication::normalize`] before it is
/// committed, so a row can only reach storage in normalized form; every
/// listing carries the requested [`VisibilityScope`] compiled against the
/// database's `now()`.
#[derive(Clone)]
pub struct PublishableRepository {
    database: &'static Database,
    entity: PublishableEntity,
}

impl PublishableRepository {
    pub fn new(database: &'static Database, entity: PublishableEntity) -> Self {
        Self { database, entity }
    }

    pub fn entity(&self) -> &PublishableEntity {
        &self.entity
    }

    /// List rows matching the scope, ordered by id.
    pub async fn list(
        &self,
        scope: VisibilityScope,
    ) -> Result<Vec<PublicationRow>, RepositoryError> {
        let (sql, params) = self.entity.listing_query(scope);
        debug!(%sql, "running listing query");

        let mut query_object = sqlx::query(&sql);
        for param in params {
            query_object = param.bind_to_query(query_object);
        }

        let rows = query_object
            .fetch_all(self.database.database_pool())
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.iter().map(|row| self.row_to_publication(row)).collect()
    }

    /// Load one row regardless of visibility.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<PublicationRow>, RepositoryError> {
        let id_column = self.entity.id_column();
        let columns = PublicationColumnRefs::new(&self.entity.columns, MAIN_ALIAS);

        let builder = QueryBuilder::from(Table::from(&self.entity.table))
            .select(PublishableEntity::selected_columns(&id_column, &columns))
            .where_condition(Condition::Equals {
                column: Cow::Borrowed(&id_column),
                value: ConditionValue::Integer(id),
            });

        let (sql, params) = builder.build();
        debug!(%sql, id, "running find query");

        let mut query_object = sqlx::query(&sql);
        for param in params {
            query_object = param.bind_to_query(query_object);
        }

        let row = query_object
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(|row| self.row_to_publication(&row)).transpose()
    }

    /// Count rows matching the scope.
    pub async fn count(&self, scope: VisibilityScope) -> Result<i64, RepositoryError> {
        let columns = PublicationColumnRefs::new(&self.entity.columns, MAIN_ALIAS);
        let mut builder = QueryBuilder::from(Table::from(&self.entity.table)).select_count();
        if let Some(condition) = scope.condition(&columns) {
            builder = builder.where_condition(condition);
        }

        let (sql, params) = builder.build();
        let mut query_object = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            query_object = match param {
                SqlParameter::Text(s) => query_object.bind(s),
                SqlParameter::Integer(i) => query_object.bind(i),
            };
        }

        query_object
            .fetch_one(self.database.database_pool())
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    /// Persist a pending change to an existing row. The before-save hook:
    /// the publication is normalized against `now` before the UPDATE, and the
    /// caller's value reflects what was stored.
    pub async fn save_at(
        &self,
        row: &mut PublicationRow,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        row.publication.normalize(now);

        let result = sqlx::query(&self.entity.update_sql())
            .bind(row.publication.status)
            .bind(row.publication.published_first_at)
            .bind(row.publication.published_at)
            .bind(row.publication.expired_at)
            .bind(row.id)
            .execute(self.database.database_pool())
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// [`PublishableRepository::save_at`] against the wall clock.
    pub async fn save(&self, row: &mut PublicationRow) -> Result<(), RepositoryError> {
        self.save_at(row, Utc::now()).await
    }

    /// Insert a new row, normalizing the pending publication first.
    pub async fn insert_at(
        &self,
        mut publication: Publication,
        now: DateTime<Utc>,
    ) -> Result<PublicationRow, RepositoryError> {
        publication.normalize(now);

        let id: i64 = sqlx::query_scalar(&self.entity.insert_sql())
            .bind(publication.status)
            .bind(publication.published_first_at)
            .bind(publication.published_at)
            .bind(publication.expired_at)
            .fetch_one(self.database.database_pool())
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(PublicationRow { id, publication })
    }

    /// [`PublishableRepository::insert_at`] against the wall clock.
    pub async fn insert(&self, publication: Publication) -> Result<PublicationRow, RepositoryError> {
        self.insert_at(publication, Utc::now()).await
    }

    fn row_to_publication(
        &self,
        row: &sqlx::postgres::PgRow,
    ) -> Result<PublicationRow, RepositoryError> {
        let columns = &self.entity.columns;

        let id: i64 = row
            .try_get(self.entity.id_column.as_str())
            .map_err(|e| RepositoryError::DatabaseError(format!("failed to read id: {}", e)))?;

        let status = row.try_get(columns.status.as_str()).map_err(|e| {
            RepositoryError::DatabaseError(format!("failed to read publication status: {}", e))
        })?;

        let published_first_at: Option<DateTime<Utc>> = row
            .try_get(columns.published_first_at.as_str())
            .map_err(|e| {
                RepositoryError::DatabaseError(format!("failed to read first publication: {}", e))
            })?;

        let published_at: Option<DateTime<Utc>> =
            row.try_get(columns.published_at.as_str()).map_err(|e| {
                RepositoryError::DatabaseError(format!("failed to read window start: {}", e))
            })?;

        let expired_at: Option<DateTime<Utc>> =
            row.try_get(columns.expired_at.as_str()).map_err(|e| {
                RepositoryError::DatabaseError(format!("failed to read window end: {}", e))
            })?;

        Ok(PublicationRow {
            id,
            publication: Publication {
                status,
                published_first_at,
                published_at,
                expired_at,
            },
        })
    }
}
