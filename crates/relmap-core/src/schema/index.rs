//! Index descriptors.

use super::attribute::AttributeDescriptor;
use crate::config::NamingConventions;
use crate::naming;
use serde::{Deserialize, Serialize};

/// Immutable description of one index.
///
/// The order of `attributes` is the index column order and is significant for
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Indexed attributes in column order.
    pub attributes: Vec<AttributeDescriptor>,
    /// Index name, when declared or reported by the catalog.
    pub name: Option<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Storage or access-method hint (`btree`, `gin`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl IndexDescriptor {
    /// Create a non-unique, unnamed index over `attributes`.
    pub fn new(attributes: Vec<AttributeDescriptor>) -> Self {
        Self {
            attributes,
            name: None,
            unique: false,
            kind: None,
        }
    }

    /// Set the index name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark as unique.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the storage hint.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Indexed column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// The declared name, or the deterministic composite of relation and
    /// column names.
    pub fn effective_name(&self, relation: &str, naming: &NamingConventions) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => naming::index_name(relation, &self.column_names(), naming),
        }
    }

    /// Check if the index covers exactly the given columns, in order.
    pub fn covers(&self, columns: &[&str]) -> bool {
        self.column_names() == columns
    }
}
