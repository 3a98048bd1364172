//! Foreign key descriptors.

use super::attribute::AttributeDescriptor;
use serde::{Deserialize, Serialize};

/// Immutable description of one foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// Constraint name, when the catalog reports one.
    pub name: Option<String>,
    /// Referencing attributes in constraint column order.
    pub attributes: Vec<AttributeDescriptor>,
    /// Referenced relation.
    pub parent_table: String,
    /// Referenced columns; empty means the parent's primary key.
    pub parent_keys: Vec<String>,
}

impl ForeignKeyDescriptor {
    /// Create a foreign key referencing the parent's primary key.
    pub fn new(attributes: Vec<AttributeDescriptor>, parent_table: impl Into<String>) -> Self {
        Self {
            name: None,
            attributes,
            parent_table: parent_table.into(),
            parent_keys: Vec::new(),
        }
    }

    /// Set the constraint name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the referenced columns.
    pub fn with_parent_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.parent_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Referencing column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Check if this key references `relation`.
    pub fn references(&self, relation: &str) -> bool {
        self.parent_table == relation
    }

    /// Check if this is a single-column key on `column`.
    pub fn is_on(&self, column: &str) -> bool {
        self.attributes.len() == 1 && self.attributes[0].name == column
    }
}
