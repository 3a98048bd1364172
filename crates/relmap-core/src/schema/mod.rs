//! Structural descriptors of relations.

mod attribute;
mod declaration;
mod foreign_key;
mod index;
mod schema;
mod types;

pub use attribute::AttributeDescriptor;
pub use declaration::{AttributeDecl, IndexDecl, IndexDsl, RelationDeclaration};
pub use foreign_key::ForeignKeyDescriptor;
pub use index::IndexDescriptor;
pub use schema::Schema;
pub use types::SemanticType;
