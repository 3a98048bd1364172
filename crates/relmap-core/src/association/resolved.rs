//! Associations bound to concrete join paths.

use super::definition::{AssociationDefinition, AssociationKind};
use crate::schema::ForeignKeyDescriptor;
use serde::Serialize;
use std::ops::Index;

/// Number of target rows the query layer should expect per source row.
///
/// This is a query-time contract only; one-to-one uniqueness is not
/// enforced by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one row.
    One,
    /// Any number of rows.
    Many,
}

/// The target side of a resolved association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssociationTarget {
    /// Target relation.
    pub relation: String,
    /// Effective association name.
    pub name: String,
    /// Whether the name was renamed away from its natural form.
    pub aliased: bool,
}

impl AssociationTarget {
    /// Check if the association was renamed.
    pub fn is_aliased(&self) -> bool {
        self.aliased
    }
}

/// How source and target rows are joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinPath {
    /// A foreign key on `owner` references `parent`.
    Direct {
        /// Relation holding the foreign key.
        owner: String,
        /// The foreign key.
        foreign_key: ForeignKeyDescriptor,
        /// Referenced relation.
        parent: String,
        /// Referenced columns, in foreign-key column order.
        parent_keys: Vec<String>,
    },
    /// Rows are joined through an intermediate relation.
    Through {
        /// The join relation.
        through: String,
        /// Foreign key on the join relation referencing the source.
        source_key: ForeignKeyDescriptor,
        /// Referenced source columns.
        source_parent_keys: Vec<String>,
        /// Foreign key on the join relation referencing the target.
        target_key: ForeignKeyDescriptor,
        /// Referenced target columns.
        target_parent_keys: Vec<String>,
    },
}

/// An association definition bound to its join path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAssociation {
    /// The canonical definition.
    pub definition: AssociationDefinition,
    /// Target relation and effective name.
    pub target: AssociationTarget,
    /// Join path discovered during resolution.
    pub join: JoinPath,
}

impl ResolvedAssociation {
    /// Effective association name.
    pub fn name(&self) -> &str {
        &self.target.name
    }

    /// Canonical kind.
    pub fn kind(&self) -> AssociationKind {
        self.definition.kind
    }

    /// Expected number of target rows per source row.
    pub fn cardinality(&self) -> Cardinality {
        if self.definition.kind.is_singular() {
            Cardinality::One
        } else {
            Cardinality::Many
        }
    }

    /// Qualified column pairs to join on, in join order from source towards
    /// target.
    pub fn join_columns(&self) -> Vec<(String, String)> {
        match &self.join {
            JoinPath::Direct {
                owner,
                foreign_key,
                parent,
                parent_keys,
            } => {
                let pairs = foreign_key.column_names().into_iter().zip(parent_keys);
                if *owner == self.definition.source {
                    pairs
                        .map(|(fk, pk)| (format!("{owner}.{fk}"), format!("{parent}.{pk}")))
                        .collect()
                } else {
                    pairs
                        .map(|(fk, pk)| (format!("{parent}.{pk}"), format!("{owner}.{fk}")))
                        .collect()
                }
            }
            JoinPath::Through {
                through,
                source_key,
                source_parent_keys,
                target_key,
                target_parent_keys,
            } => {
                let source = &self.definition.source;
                let target = &self.definition.target;
                let inbound = source_key
                    .column_names()
                    .into_iter()
                    .zip(source_parent_keys)
                    .map(|(fk, pk)| (format!("{source}.{pk}"), format!("{through}.{fk}")));
                let outbound = target_key
                    .column_names()
                    .into_iter()
                    .zip(target_parent_keys)
                    .map(|(fk, pk)| (format!("{through}.{fk}"), format!("{target}.{pk}")));
                inbound.chain(outbound).collect()
            }
        }
    }
}

/// The resolved associations of one relation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedAssociations {
    entries: Vec<ResolvedAssociation>,
}

impl ResolvedAssociations {
    pub(crate) fn from_entries(entries: Vec<ResolvedAssociation>) -> Self {
        Self { entries }
    }

    /// Get an association by effective name.
    pub fn get(&self, name: &str) -> Option<&ResolvedAssociation> {
        self.entries.iter().find(|a| a.name() == name)
    }

    /// Check if an association with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Effective names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|a| a.name()).collect()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedAssociation> {
        self.entries.iter()
    }

    /// Number of associations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no associations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for ResolvedAssociations {
    type Output = ResolvedAssociation;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(association) => association,
            None => panic!("no association named {name:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a ResolvedAssociations {
    type Item = &'a ResolvedAssociation;
    type IntoIter = std::slice::Iter<'a, ResolvedAssociation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
