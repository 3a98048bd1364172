//! relmap core - schema inference and association resolution.
//!
//! Relations are described by [`Schema`]s, built from explicit declarations,
//! inferred from a database catalog, or both. Associations declared between
//! relations are resolved against those schemas into concrete join paths and
//! collected in an immutable [`Registry`].

pub mod association;
pub mod config;
pub mod error;
pub mod inference;
pub mod naming;
pub mod registry;
pub mod schema;

pub use association::{
    suggest_associations, AssociationDefinition, AssociationDsl, AssociationKind,
    AssociationResolver, AssociationTarget, Cardinality, JoinPath, ResolvedAssociation,
    ResolvedAssociations, SchemaLookup,
};
pub use config::{InferenceConfig, NamingConventions, RegistryConfig};
pub use error::{Error, Result, UnsupportedType};
pub use inference::{
    CatalogSource, ColumnInfo, ForeignKeyRow, IndexRow, Inferred, SchemaInferrer, TypeMapping,
};
#[cfg(feature = "sqlite")]
pub use inference::SqliteCatalog;
pub use registry::{Registry, RegistryBuilder};
pub use schema::{
    AttributeDecl, AttributeDescriptor, ForeignKeyDescriptor, IndexDescriptor,
    RelationDeclaration, Schema, SemanticType,
};
