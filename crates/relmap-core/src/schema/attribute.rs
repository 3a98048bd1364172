//! Attribute (column) descriptors.

use super::types::SemanticType;
use serde::{Deserialize, Serialize};

/// Immutable description of one column of a relation.
///
/// Equality is structural: two descriptors with identical fields are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Column name.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub ty: SemanticType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Relation referenced by this column, if it is a foreign key.
    pub references: Option<String>,
    /// Default value expression reported by the catalog.
    pub default: Option<String>,
    /// Relation owning this column.
    pub source: String,
}

impl AttributeDescriptor {
    /// Create a non-null, non-key attribute.
    pub fn new(source: impl Into<String>, name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            primary_key: false,
            references: None,
            default: None,
            source: source.into(),
        }
    }

    /// Mark as part of the primary key.
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as nullable.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as a foreign key referencing `relation`.
    pub fn with_references(mut self, relation: impl Into<String>) -> Self {
        self.references = Some(relation.into());
        self
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Check if this attribute is a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }

    /// Qualified `relation.column` name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.source, self.name)
    }
}
