//! Schema inference from database catalogs.

mod catalog;
mod inferrer;
#[cfg(feature = "sqlite")]
mod sqlite;
mod type_map;

pub use catalog::{CatalogSource, ColumnInfo, ForeignKeyRow, IndexRow};
pub use inferrer::{Inferred, SchemaInferrer};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCatalog;
pub use type_map::TypeMapping;
