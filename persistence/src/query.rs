use publishable_common::PublicationStatus;

use crate::schema::{ColumnRef, Table};

/// High-level, composable query builder over one publishable table.
#[derive(Clone, Debug)]
pub struct QueryBuilder<'a> {
    from_table: Table<'a>,
    select: Selection<'a>,
    where_conditions: Vec<Condition<'a>>,
    order_by: Vec<OrderBy<'a>>,
    limit: Option<i64>,
    offset: Option<i64>,
    joins: Vec<Join<'a>>,
}

/// What the query projects. Kept as its own state so a row listing and a
/// COUNT(*) can never be conflated through an empty column list.
#[derive(Clone, Debug)]
enum Selection<'a> {
    Columns(Vec<ColumnRef<'a>>),
    Count,
}

/// A where condition; top-level conditions are AND'ed together.
///
/// Time comparisons are expressed against the database's `now()`, never an
/// application-bound timestamp, so a listing and a concurrently committed
/// save agree on the evaluation instant.
#[derive(Clone, Debug)]
pub enum Condition<'a> {
    /// field = value
    Equals {
        column: ColumnRef<'a>,
        value: ConditionValue,
    },

    /// field IN (values)
    In {
        column: ColumnRef<'a>,
        values: Vec<ConditionValue>,
    },

    /// field IS NULL
    IsNull { column: ColumnRef<'a> },

    /// field IS NOT NULL
    IsNotNull { column: ColumnRef<'a> },

    /// field <= now()
    OnOrBeforeNow { column: ColumnRef<'a> },

    /// field > now()
    AfterNow { column: ColumnRef<'a> },

    /// Every part matches; renders as a parenthesized AND
    All(Vec<Condition<'a>>),

    /// At least one part matches; renders as a parenthesized OR
    Any(Vec<Condition<'a>>),
}

#[derive(Debug, Clone)]
pub enum ConditionValue {
    Text(String),
    Integer(i64),
    Status(PublicationStatus),
}

#[derive(Clone, Debug)]
pub struct OrderBy<'a> {
    pub column: ColumnRef<'a>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Debug)]
pub struct Join<'a> {
    pub target_table: Table<'a>,
    pub main_column: ColumnRef<'a>,
    pub target_column: ColumnRef<'a>,
}

impl<'a> From<Table<'a>> for QueryBuilder<'a> {
    fn from(value: Table<'a>) -> Self {
        QueryBuilder {
            from_table: value,
            select: Selection::Columns(vec![]),
            where_conditions: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
            joins: vec![],
        }
    }
}

impl<'a> QueryBuilder<'a> {
    /// Select specified columns
    pub fn select(mut self, columns: Vec<ColumnRef<'a>>) -> Self {
        self.select = Selection::Columns(columns);
        self
    }

    /// Select COUNT(*) instead of columns
    pub fn select_count(mut self) -> Self {
        self.select = Selection::Count;
        self
    }

    /// Add where condition
    pub fn where_condition(mut self, condition: Condition<'a>) -> Self {
        self.where_conditions.push(condition);
        self
    }

    /// Add inner join
    pub fn join(mut self, join: Join<'a>) -> Self {
        self.joins.push(join);
        self
    }

    /// Add order by clause
    pub fn order_by(mut self, order_by: OrderBy<'a>) -> Self {
        self.order_by.push(order_by);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build the SQL query string
    pub fn build(self) -> (String, Vec<SqlParameter>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut param_counter = 1;

        // SELECT clause
        sql.push_str("SELECT ");
        match &self.select {
            Selection::Count => sql.push_str("COUNT(*)"),
            Selection::Columns(columns) if columns.is_empty() => sql.push_str("*"),
            Selection::Columns(columns) => {
                let columns: Vec<String> = columns.iter().map(|c| c.qualified()).collect();
                sql.push_str(&columns.join(", "));
            }
        }

        // FROM clause
        sql.push_str(&format!("\nFROM {}", self.from_table.qualified()));

        // JOIN clauses
        for join in &self.joins {
            sql.push_str(&format!(
                "\nINNER JOIN {} ON {} = {}",
                join.target_table.qualified(),
                join.main_column.qualified(),
                join.target_column.qualified()
            ));
        }

        // WHERE clause
        if !self.where_conditions.is_empty() {
            sql.push_str("\nWHERE ");
            let mut where_sql = Vec::new();
            for condition in &self.where_conditions {
                let (cond_sql, cond_params) = condition.to_sql(&mut param_counter);
                where_sql.push(cond_sql);
                params.extend(cond_params);
            }
            sql.push_str(&where_sql.join(" AND "));
        }

        // ORDER BY clause
        if !self.order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|ob| {
                    let direction = match ob.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{} {}", ob.column.qualified(), direction)
                })
                .collect();
            sql.push_str(&order_clauses.join(", "));
        }

        // LIMIT clause
        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
        }
        // OFFSET clause
        if let Some(offset) = self.offset {
            sql.push_str(&format!("\nOFFSET {}", offset));
        }

        (sql, params)
    }
}

impl<'a> Condition<'a> {
    pub fn to_sql(&self, param_counter: &mut usize) -> (String, Vec<SqlParameter>) {
        match self {
            Condition::Equals { column, value } => {
                let sql = format!("{} = ${}", column.qualified(), param_counter);
                *param_counter += 1;
                (sql, vec![value.into()])
            }

            Condition::In { column, values } => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|_| {
                        let placeholder = format!("${}", param_counter);
                        *param_counter += 1;
                        placeholder
                    })
                    .collect();

                let sql = format!("{} IN ({})", column.qualified(), placeholders.join(", "));
                let params: Vec<SqlParameter> = values.iter().map(|v| v.into()).collect();
                (sql, params)
            }

            Condition::IsNull { column } => (format!("{} IS NULL", column.qualified()), vec![]),

            Condition::IsNotNull { column } => {
                (format!("{} IS NOT NULL", column.qualified()), vec![])
            }

            Condition::OnOrBeforeNow { column } => {
                (format!("{} <= now()", column.qualified()), vec![])
            }

            Condition::AfterNow { column } => (format!("{} > now()", column.qualified()), vec![]),

            Condition::All(parts) => Self::grouped(parts, " AND ", "TRUE", param_counter),

            Condition::Any(parts) => Self::grouped(parts, " OR ", "FALSE", param_counter),
        }
    }

    fn grouped(
        parts: &[Condition<'a>],
        separator: &str,
        empty: &str,
        param_counter: &mut usize,
    ) -> (String, Vec<SqlParameter>) {
        if parts.is_empty() {
            return (empty.to_owned(), vec![]);
        }

        let mut rendered = Vec::new();
        let mut params = Vec::new();
        for part in parts {
            let (part_sql, part_params) = part.to_sql(param_counter);
            rendered.push(part_sql);
            params.extend(part_params);
        }
        (format!("({})", rendered.join(separator)), params)
    }
}

impl From<&ConditionValue> for SqlParameter {
    fn from(value: &ConditionValue) -> Self {
        match value {
            ConditionValue::Text(s) => SqlParameter::Text(s.clone()),
            ConditionValue::Integer(i) => SqlParameter::Integer(*i),
            ConditionValue::Status(status) => SqlParameter::Text(status.as_str().to_owned()),
        }
    }
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone)]
pub enum SqlParameter {
    Text(String),
    Integer(i64),
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        match self {
            SqlParameter::Text(s) => query.bind(s),
            SqlParameter::Integer(i) => query.bind(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use crate::schema::Column;

    use super::*;

    #[test]
    fn simple_select_with_equality() {
        let table = Table {
            name: "articles",
            alias: "m",
        };
        let builder = QueryBuilder::from(table)
            .select(vec![Cow::Owned(Column {
                qualifier: "m",
                name: "id",
            })])
            .where_condition(Condition::Equals {
                column: Cow::Owned(Column {
                    qualifier: "m",
                    name: "publication_status",
                }),
                value: ConditionValue::Status(PublicationStatus::Draft),
            });

        let (sql, params) = builder.build();

        assert!(sql.contains("SELECT \"m\".\"id\"\nFROM \"articles\" AS \"m\""));
        assert!(sql.contains("WHERE \"m\".\"publication_status\" = $1"));
        assert!(matches!(&params[0], SqlParameter::Text(s) if s == "draft"));
    }

    #[test]
    fn empty_column_list_is_not_a_count_query() {
        let table = Table {
            name: "articles",
            alias: "m",
        };

        let (sql, _) = QueryBuilder::from(table.clone()).select(vec![]).build();
        assert!(sql.starts_with("SELECT *\n"));

        let (sql, _) = QueryBuilder::from(table).select_count().build();
        assert!(sql.starts_with("SELECT COUNT(*)\n"));
    }

    #[test]
    fn pagination_renders_after_ordering() {
        let table = Table {
            name: "articles",
            alias: "m",
        };
        let id = Column {
            qualifier: "m",
            name: "id",
        };
        let (sql, _) = QueryBuilder::from(table)
            .select(vec![Cow::Borrowed(&id)])
            .order_by(OrderBy {
                column: Cow::Borrowed(&id),
                direction: SortDirection::Descending,
            })
            .limit(10)
            .offset(20)
            .build();

        assert!(sql.ends_with("ORDER BY \"m\".\"id\" DESC\nLIMIT 10\nOFFSET 20"));
    }

    #[test]
    fn now_comparisons_take_no_parameters() {
        let column = Column {
            qualifier: "m",
            name: "published_at",
        };
        let mut counter = 1;
        let (sql, params) = Condition::OnOrBeforeNow {
            column: Cow::Borrowed(&column),
        }
        .to_sql(&mut counter);

        assert_eq!(sql, "\"m\".\"published_at\" <= now()");
        assert!(params.is_empty());
        assert_eq!(counter, 1);
    }

    #[test]
    fn grouped_conditions_render_parenthesized() {
        let status = Column {
            qualifier: "m",
            name: "publication_status",
        };
        let expired = Column {
            qualifier: "m",
            name: "expired_at",
        };

        let condition = Condition::Any(vec![
            Condition::Equals {
                column: Cow::Borrowed(&status),
                value: ConditionValue::Status(PublicationStatus::Published),
            },
            Condition::All(vec![
                Condition::IsNotNull {
                    column: Cow::Borrowed(&expired),
                },
                Condition::AfterNow {
                    column: Cow::Borrowed(&expired),
                },
            ]),
        ]);

        let mut counter = 1;
        let (sql, params) = condition.to_sql(&mut counter);

        assert_eq!(
            sql,
            "(\"m\".\"publication_status\" = $1 OR \
             (\"m\".\"expired_at\" IS NOT NULL AND \"m\".\"expired_at\" > now()))"
        );
        assert_eq!(params.len(), 1);
        assert_eq!(counter, 2);
    }

    #[test]
    fn empty_groups_degenerate_to_constants() {
        let mut counter = 1;
        let (sql, _) = Condition::All(vec![]).to_sql(&mut counter);
        assert_eq!(sql, "TRUE");
        let (sql, _) = Condition::Any(vec![]).to_sql(&mut counter);
        assert_eq!(sql, "FALSE");
    }
}
