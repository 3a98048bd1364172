//! Relation declarations - explicit attributes, indexes and associations.
//!
//! ```
//! use relmap_core::schema::{AttributeDecl, RelationDeclaration, SemanticType};
//!
//! let posts = RelationDeclaration::new("posts")
//!     .attribute(AttributeDecl::new("id", SemanticType::Integer).primary_key())
//!     .attribute(AttributeDecl::new("user_id", SemanticType::Integer).foreign_key("users"))
//!     .attribute(AttributeDecl::new("title", SemanticType::String))
//!     .indexes(|ix| {
//!         ix.index(["title"]).unique();
//!     })
//!     .associations(|a| {
//!         a.belongs_to("user");
//!         a.one_to_many("tags").through("posts_tags");
//!     });
//!
//! let schema = posts.build_schema(None).unwrap();
//! assert_eq!(schema.foreign_keys().len(), 1);
//! assert_eq!(posts.definitions().len(), 2);
//! ```

use super::{AttributeDescriptor, IndexDescriptor, Schema, SemanticType};
use crate::association::{AssociationDefinition, AssociationDsl};
use crate::error::{Error, Result};

/// An explicitly declared attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    name: String,
    ty: SemanticType,
    primary_key: bool,
    nullable: bool,
    references: Option<String>,
    default: Option<String>,
}

impl AttributeDecl {
    /// Declare a non-null attribute.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            primary_key: false,
            nullable: false,
            references: None,
            default: None,
        }
    }

    /// Mark as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as a foreign key referencing `relation`.
    pub fn foreign_key(mut self, relation: impl Into<String>) -> Self {
        self.references = Some(relation.into());
        self
    }

    /// Set the default value expression.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self, relation: &str) -> AttributeDescriptor {
        AttributeDescriptor {
            name: self.name.clone(),
            ty: self.ty,
            nullable: self.nullable,
            primary_key: self.primary_key,
            references: self.references.clone(),
            default: self.default.clone(),
            source: relation.to_string(),
        }
    }
}

/// One `index(*attributes, name:, unique:, type:)` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDecl {
    columns: Vec<String>,
    name: Option<String>,
    unique: bool,
    kind: Option<String>,
}

impl IndexDecl {
    /// Name the index.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Make the index unique.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Set the storage hint.
    pub fn using(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Accumulates the directives of an `indexes` block.
#[derive(Debug, Clone, Default)]
pub struct IndexDsl {
    declarations: Vec<IndexDecl>,
}

impl IndexDsl {
    /// Declare an index over `columns`, in order.
    pub fn index<I, S>(&mut self, columns: I) -> &mut IndexDecl
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declarations.push(IndexDecl {
            columns: columns.into_iter().map(Into::into).collect(),
            name: None,
            unique: false,
            kind: None,
        });
        let last = self.declarations.len() - 1;
        &mut self.declarations[last]
    }
}

/// The declaration of one relation.
#[derive(Debug, Clone)]
pub struct RelationDeclaration {
    name: String,
    infer: bool,
    attributes: Vec<AttributeDecl>,
    indexes: Vec<IndexDecl>,
    definitions: Vec<AssociationDefinition>,
}

impl RelationDeclaration {
    /// Start declaring `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            infer: false,
            attributes: Vec::new(),
            indexes: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Infer the schema from the catalog; declared attributes override the
    /// inferred ones.
    pub fn infer(mut self) -> Self {
        self.infer = true;
        self
    }

    /// Declare an attribute.
    pub fn attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Evaluate an `indexes` block.
    pub fn indexes(mut self, block: impl FnOnce(&mut IndexDsl)) -> Self {
        let mut dsl = IndexDsl::default();
        block(&mut dsl);
        self.indexes.extend(dsl.declarations);
        self
    }

    /// Evaluate an `associations` block. Directives are canonicalized when
    /// the block ends.
    pub fn associations(mut self, block: impl FnOnce(&mut AssociationDsl)) -> Self {
        let mut dsl = AssociationDsl::new(self.name.clone());
        block(&mut dsl);
        self.definitions.extend(dsl.finish());
        self
    }

    /// Add already canonical definitions, such as those proposed by
    /// [`suggest_associations`](crate::association::suggest_associations).
    pub fn with_definitions(
        mut self,
        definitions: impl IntoIterator<Item = AssociationDefinition>,
    ) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the schema comes from catalog inference.
    pub fn infers(&self) -> bool {
        self.infer
    }

    /// Canonical association definitions in declaration order.
    pub fn definitions(&self) -> &[AssociationDefinition] {
        &self.definitions
    }

    /// Build the relation's schema, overlaying the declaration on the
    /// inferred schema when there is one.
    ///
    /// Declared attributes replace inferred attributes of the same name in
    /// place, or are appended. Declared indexes are added to inferred ones.
    pub fn build_schema(&self, inferred: Option<&Schema>) -> Result<Schema> {
        let (mut attributes, mut indexes, foreign_keys) = match inferred {
            Some(schema) => (
                schema.attributes().to_vec(),
                schema.indexes().to_vec(),
                schema.foreign_keys().to_vec(),
            ),
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let mut declared = std::collections::HashSet::new();
        for decl in &self.attributes {
            if !declared.insert(decl.name()) {
                return Err(Error::DuplicateAttribute {
                    relation: self.name.clone(),
                    attribute: decl.name.clone(),
                });
            }
            let descriptor = decl.descriptor(&self.name);
            match attributes.iter_mut().find(|a| a.name == descriptor.name) {
                Some(existing) => *existing = descriptor,
                None => attributes.push(descriptor),
            }
        }

        for decl in &self.indexes {
            let columns = decl
                .columns
                .iter()
                .map(|column| {
                    attributes
                        .iter()
                        .find(|a| a.name == *column)
                        .cloned()
                        .ok_or_else(|| Error::UnknownAttribute {
                            relation: self.name.clone(),
                            attribute: column.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut index = IndexDescriptor::new(columns).with_unique(decl.unique);
            if let Some(name) = &decl.name {
                index = index.with_name(name);
            }
            if let Some(kind) = &decl.kind {
                index = index.with_kind(kind);
            }
            indexes.push(index);
        }

        Schema::new(self.name.clone(), attributes, indexes, foreign_keys)
    }
}
