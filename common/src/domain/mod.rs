pub mod columns;
pub mod label;
pub mod publication;
pub mod status;
pub mod visibility;

pub use columns::{ColumnName, PublicationColumns, TableName};
pub use label::{PlainRenderer, PublicationLabel, RenderLabel};
pub use publication::Publication;
pub use status::{PublicationStatus, UnknownStatus};
pub use visibility::{TimeField, VisibilityExpr};
