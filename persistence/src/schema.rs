use std::borrow::Cow;

use publishable_common::{PublicationColumns, TableName, TimeField};

// Represents a table in database
#[derive(Clone, Debug)]
pub struct Table<'a> {
    pub name: &'a str,
    pub alias: &'static str,
}

impl<'a> Table<'a> {
    /// Get qualified table name with alias
    pub fn qualified(&self) -> String {
        format!("\"{}\" AS \"{}\"", self.name, self.alias)
    }
}

impl<'a> From<&'a TableName> for Table<'a> {
    fn from(value: &'a TableName) -> Self {
        Table {
            name: value.as_str(),
            alias: "m",
        }
    }
}

/// Represents one column in the database table
#[derive(Clone, Debug)]
pub struct Column<'a> {
    pub qualifier: &'static str,
    pub name: &'a str,
}

impl<'a> Column<'a> {
    /// Get qualified column name
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.qualifier, self.name)
    }
}

/// Column reference which can be either borrowed or owned
pub type ColumnRef<'a> = Cow<'a, Column<'a>>;

/// The four publication columns of one entity type, resolved to a table
/// qualifier so every predicate stays correct inside joined queries.
pub struct PublicationColumnRefs<'a> {
    pub status: Column<'a>,
    pub published_first_at: Column<'a>,
    pub published_at: Column<'a>,
    pub expired_at: Column<'a>,
}

impl<'a> PublicationColumnRefs<'a> {
    pub fn new(columns: &'a PublicationColumns, qualifier: &'static str) -> Self {
        Self {
            status: Column {
                qualifier,
                name: columns.status.as_str(),
            },
            published_first_at: Column {
                qualifier,
                name: columns.published_first_at.as_str(),
            },
            published_at: Column {
                qualifier,
                name: columns.published_at.as_str(),
            },
            expired_at: Column {
                qualifier,
                name: columns.expired_at.as_str(),
            },
        }
    }

    pub fn for_field(&self, field: TimeField) -> &Column<'a> {
        match field {
            TimeField::PublishedAt => &self.published_at,
            TimeField::ExpiredAt => &self.expired_at,
        }
    }
}
