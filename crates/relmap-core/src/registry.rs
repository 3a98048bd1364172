//! Relation registry - the built, immutable set of schemas and resolved
//! associations.

use crate::association::{AssociationResolver, ResolvedAssociations};
use crate::config::RegistryConfig;
use crate::error::{Error, Result, UnsupportedType};
use crate::inference::{CatalogSource, SchemaInferrer};
use crate::schema::{RelationDeclaration, Schema};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Collects relation declarations and builds a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
    declarations: Vec<RelationDeclaration>,
}

impl RegistryBuilder {
    /// Create a builder.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            declarations: Vec::new(),
        }
    }

    /// Declare a relation. A second declaration of the same name replaces
    /// the first.
    pub fn declare(mut self, declaration: RelationDeclaration) -> Self {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.name() == declaration.name())
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
        self
    }

    /// Declared relation names in declaration order.
    pub fn declared(&self) -> Vec<&str> {
        self.declarations.iter().map(|d| d.name()).collect()
    }

    /// Build schemas for every declaration, then resolve every relation's
    /// associations against them.
    ///
    /// Declarations marked for inference require a catalog; without one, or
    /// without a catalog entry, the build fails with
    /// [`Error::NoSuchRelation`]. The first error aborts the build.
    #[instrument(skip_all, fields(relations = self.declarations.len()))]
    pub fn build(self, catalog: Option<&dyn CatalogSource>) -> Result<Registry> {
        let inferrer = catalog.map(|c| SchemaInferrer::new(c, self.config.inference.clone()));

        let mut schemas: BTreeMap<String, Arc<Schema>> = BTreeMap::new();
        let mut degraded = Vec::new();
        for declaration in &self.declarations {
            let inferred = if declaration.infers() {
                let inferrer = inferrer.as_ref().ok_or_else(|| Error::NoSuchRelation {
                    relation: declaration.name().to_string(),
                })?;
                let inferred = inferrer.infer(declaration.name())?;
                degraded.extend(inferred.degraded);
                Some(inferred.schema)
            } else {
                None
            };

            let schema = declaration.build_schema(inferred.as_ref())?;
            debug!(relation = %schema.name(), attributes = schema.len(), "Built schema");
            schemas.insert(declaration.name().to_string(), Arc::new(schema));
        }

        let resolver = AssociationResolver::new(&schemas)
            .with_naming(self.config.naming.clone())
            .detect_conventions(self.config.detect_conventions);

        let mut associations = BTreeMap::new();
        for declaration in &self.declarations {
            let resolved = resolver.resolve(declaration.definitions())?;
            associations.insert(declaration.name().to_string(), Arc::new(resolved));
        }

        let order: Vec<String> = self
            .declarations
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        info!(
            relations = order.len(),
            associations = associations.values().map(|a| a.len()).sum::<usize>(),
            degraded = degraded.len(),
            "Registry built"
        );

        Ok(Registry {
            order,
            schemas,
            associations,
            degraded,
        })
    }
}

/// Immutable registry of schemas and resolved associations.
///
/// Cheap to clone; schemas and associations are shared.
#[derive(Debug, Clone)]
pub struct Registry {
    order: Vec<String>,
    schemas: BTreeMap<String, Arc<Schema>>,
    associations: BTreeMap<String, Arc<ResolvedAssociations>>,
    degraded: Vec<UnsupportedType>,
}

impl Registry {
    /// Get the schema of a relation.
    pub fn schema(&self, relation: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(relation)
    }

    /// Get the resolved associations of a relation.
    pub fn associations(&self, relation: &str) -> Option<&Arc<ResolvedAssociations>> {
        self.associations.get(relation)
    }

    /// Relation names in declaration order.
    pub fn relation_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Check if a relation is registered.
    pub fn contains(&self, relation: &str) -> bool {
        self.schemas.contains_key(relation)
    }

    /// Columns degraded to `any` during inference.
    pub fn degraded(&self) -> &[UnsupportedType] {
        &self.degraded
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry has no relations.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationKind, Cardinality};
    use crate::schema::{AttributeDecl, SemanticType};

    fn users() -> RelationDeclaration {
        RelationDeclaration::new("users")
            .attribute(AttributeDecl::new("id", SemanticType::Integer).primary_key())
            .attribute(AttributeDecl::new("name", SemanticType::String))
            .associations(|a| {
                a.has_many("posts");
            })
    }

    fn posts() -> RelationDeclaration {
        RelationDeclaration::new("posts")
            .attribute(AttributeDecl::new("id", SemanticType::Integer).primary_key())
            .attribute(AttributeDecl::new("user_id", SemanticType::Integer).foreign_key("users"))
            .associations(|a| {
                a.belongs_to("user").alias("author");
            })
    }

    #[test]
    fn test_build_without_catalog() {
        let registry = RegistryBuilder::default()
            .declare(users())
            .declare(posts())
            .build(None)
            .unwrap();

        assert_eq!(registry.relation_names(), vec!["users", "posts"]);
        assert!(registry.contains("posts"));
        assert!(!registry.contains("comments"));

        let author = &registry.associations("posts").unwrap()["author"];
        assert_eq!(author.kind(), AssociationKind::ManyToOne);
        assert_eq!(author.cardinality(), Cardinality::One);
        assert_eq!(author.target.relation, "users");

        let posts = &registry.associations("users").unwrap()["posts"];
        assert_eq!(posts.cardinality(), Cardinality::Many);
    }

    #[test]
    fn test_redeclaration_replaces() {
        let registry = RegistryBuilder::default()
            .declare(users())
            .declare(RelationDeclaration::new("users").attribute(
                AttributeDecl::new("id", SemanticType::Uuid).primary_key(),
            ))
            .build(None)
            .unwrap();

        let schema = registry.schema("users").unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.attribute("id").unwrap().ty, SemanticType::Uuid);
        assert!(registry.associations("users").unwrap().is_empty());
    }

    #[test]
    fn test_inference_without_catalog() {
        let err = RegistryBuilder::default()
            .declare(RelationDeclaration::new("users").infer())
            .build(None)
            .unwrap_err();

        assert!(matches!(err, Error::NoSuchRelation { ref relation } if relation == "users"));
    }

    #[test]
    fn test_unresolvable_association_aborts_build() {
        let err = RegistryBuilder::default()
            .declare(users())
            .build(None)
            .unwrap_err();

        assert!(matches!(err, Error::NoSuchRelation { ref relation } if relation == "posts"));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
