//! Canonical association definitions.

use crate::naming;
use serde::{Deserialize, Serialize};

/// Canonical kind of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// One source row relates to many target rows (foreign key on the target).
    OneToMany,
    /// Many source rows relate to one target row (foreign key on the source).
    ManyToOne,
    /// One source row relates to at most one target row (foreign key on the target).
    OneToOne,
    /// One-to-one through a join relation.
    OneToOneThrough,
    /// Many-to-many through a join relation.
    ManyToMany,
}

impl AssociationKind {
    /// Check if this kind joins through an intermediate relation.
    pub fn is_through(&self) -> bool {
        matches!(self, AssociationKind::OneToOneThrough | AssociationKind::ManyToMany)
    }

    /// Check if the association yields at most one target row.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            AssociationKind::ManyToOne | AssociationKind::OneToOne | AssociationKind::OneToOneThrough
        )
    }

    /// Snake-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::OneToMany => "one_to_many",
            AssociationKind::ManyToOne => "many_to_one",
            AssociationKind::OneToOne => "one_to_one",
            AssociationKind::OneToOneThrough => "one_to_one_through",
            AssociationKind::ManyToMany => "many_to_many",
        }
    }
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared relationship between two relations, in canonical form.
///
/// Equality is structural: definitions with identical fields are
/// interchangeable regardless of which directive produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationDefinition {
    /// Canonical kind.
    pub kind: AssociationKind,
    /// Relation declaring the association.
    pub source: String,
    /// Target relation.
    pub target: String,
    /// Join relation for through kinds.
    pub through: Option<String>,
    /// Explicit effective name.
    #[serde(rename = "as")]
    pub alias: Option<String>,
}

impl AssociationDefinition {
    /// Create a definition without join relation or alias.
    pub fn new(kind: AssociationKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            through: None,
            alias: None,
        }
    }

    /// Set the join relation.
    pub fn with_through(mut self, through: impl Into<String>) -> Self {
        self.through = Some(through.into());
        self
    }

    /// Set the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the association would have without an alias: the target relation
    /// for collection kinds, its singular for singular kinds.
    pub fn natural_name(&self) -> String {
        if self.kind.is_singular() {
            naming::singularize(&self.target)
        } else {
            self.target.clone()
        }
    }

    /// Effective name within the source relation's association set.
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.natural_name(),
        }
    }

    /// Check if an alias renames the association away from its natural name.
    pub fn is_aliased(&self) -> bool {
        self.alias
            .as_deref()
            .is_some_and(|alias| alias != self.natural_name())
    }
}
