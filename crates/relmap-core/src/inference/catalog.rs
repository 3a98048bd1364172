//! Catalog boundary - raw metadata rows reported by a database connection.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One column of a relation as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Native type name as declared.
    pub native_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value expression.
    pub default: Option<String>,
    /// 1-based position within the primary key, if the column is part of it.
    pub primary_key_position: Option<u32>,
}

impl ColumnInfo {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: true,
            default: None,
            primary_key_position: None,
        }
    }

    /// Mark as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as the `position`-th primary key column.
    pub fn primary_key(mut self, position: u32) -> Self {
        self.primary_key_position = Some(position);
        self
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// One column of a foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    /// Constraint identifier; rows sharing it form one foreign key.
    pub constraint: String,
    /// Position of this column within the constraint.
    pub position: u32,
    /// Referencing column.
    pub column: String,
    /// Referenced relation.
    pub parent_table: String,
    /// Referenced column; `None` means the parent's primary key.
    pub parent_column: Option<String>,
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Index name; `None` when the engine reports an anonymous index.
    pub index: Option<String>,
    /// Position of this column within the index.
    pub position: u32,
    /// Indexed column.
    pub column: String,
    /// Whether the index is unique.
    pub unique: bool,
    /// Access method (`btree`, `hash`, ...).
    pub method: Option<String>,
}

/// A database connection able to report catalog metadata.
///
/// Failures are connection-layer errors and propagate unmodified; nothing in
/// this crate retries them.
pub trait CatalogSource {
    /// Engine name (`sqlite`, `postgres`, ...).
    fn engine(&self) -> &str;

    /// Names of all user relations, in catalog order.
    fn relation_names(&self) -> Result<Vec<String>>;

    /// Check if the catalog has an entry for `relation`.
    fn relation_exists(&self, relation: &str) -> Result<bool>;

    /// Columns of `relation`, in declaration order.
    fn columns(&self, relation: &str) -> Result<Vec<ColumnInfo>>;

    /// Foreign-key rows of `relation`.
    fn foreign_keys(&self, relation: &str) -> Result<Vec<ForeignKeyRow>>;

    /// Index rows of `relation`, excluding primary-key indexes.
    fn indexes(&self, relation: &str) -> Result<Vec<IndexRow>>;
}

impl<C: CatalogSource + ?Sized> CatalogSource for &C {
    fn engine(&self) -> &str {
        (**self).engine()
    }

    fn relation_names(&self) -> Result<Vec<String>> {
        (**self).relation_names()
    }

    fn relation_exists(&self, relation: &str) -> Result<bool> {
        (**self).relation_exists(relation)
    }

    fn columns(&self, relation: &str) -> Result<Vec<ColumnInfo>> {
        (**self).columns(relation)
    }

    fn foreign_keys(&self, relation: &str) -> Result<Vec<ForeignKeyRow>> {
        (**self).foreign_keys(relation)
    }

    fn indexes(&self, relation: &str) -> Result<Vec<IndexRow>> {
        (**self).indexes(relation)
    }
}
