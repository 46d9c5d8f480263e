pub mod database;
pub mod query;
pub mod repository;
pub mod schema;
pub mod scopes;

pub use database::{Database, DatabaseSettings, connect};
pub use repository::{PublicationRow, PublishableEntity, PublishableRepository, RepositoryError};
pub use scopes::VisibilityScope;
