//! Associations between relations.
//!
//! Directives written in an associations block are canonicalized into
//! [`AssociationDefinition`]s, which the [`AssociationResolver`] binds to
//! foreign keys and join relations.

mod definition;
mod dsl;
mod resolved;
mod resolver;
mod suggest;

pub use definition::{AssociationDefinition, AssociationKind};
pub use dsl::{AssociationDsl, AssociationOptions, Directive, DirectiveKind, ThroughOptions};
pub use resolved::{
    AssociationTarget, Cardinality, JoinPath, ResolvedAssociation, ResolvedAssociations,
};
pub use resolver::{AssociationResolver, SchemaLookup};
pub use suggest::suggest_associations;
