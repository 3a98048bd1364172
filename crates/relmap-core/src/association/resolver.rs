//! Association resolution against inferred schemas.
//!
//! Resolution is a pure function of the definitions and the (read-only)
//! schemas: definitions are bound in declaration order, and resolving one
//! never affects another.

use super::definition::{AssociationDefinition, AssociationKind};
use super::resolved::{AssociationTarget, JoinPath, ResolvedAssociation, ResolvedAssociations};
use crate::config::NamingConventions;
use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{ForeignKeyDescriptor, Schema};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Read-only schema lookup by relation name.
pub trait SchemaLookup {
    /// Get the schema of a relation.
    fn schema(&self, relation: &str) -> Option<&Schema>;
}

impl<S: Borrow<Schema>> SchemaLookup for HashMap<String, S> {
    fn schema(&self, relation: &str) -> Option<&Schema> {
        self.get(relation).map(Borrow::borrow)
    }
}

impl<S: Borrow<Schema>> SchemaLookup for BTreeMap<String, S> {
    fn schema(&self, relation: &str) -> Option<&Schema> {
        self.get(relation).map(Borrow::borrow)
    }
}

impl SchemaLookup for [Schema] {
    fn schema(&self, relation: &str) -> Option<&Schema> {
        self.iter().find(|s| s.name() == relation)
    }
}

/// A foreign key together with the parent columns it references.
struct BoundKey {
    foreign_key: ForeignKeyDescriptor,
    parent_keys: Vec<String>,
}

/// Binds association definitions to foreign keys and join relations.
pub struct AssociationResolver<'a, L: SchemaLookup + ?Sized> {
    schemas: &'a L,
    naming: NamingConventions,
    detect_conventions: bool,
}

impl<'a, L: SchemaLookup + ?Sized> AssociationResolver<'a, L> {
    /// Create a resolver with default naming conventions and convention
    /// detection enabled.
    pub fn new(schemas: &'a L) -> Self {
        Self {
            schemas,
            naming: NamingConventions::default(),
            detect_conventions: true,
        }
    }

    /// Set the naming conventions.
    pub fn with_naming(mut self, naming: NamingConventions) -> Self {
        self.naming = naming;
        self
    }

    /// Enable or disable binding to conventional columns without a declared
    /// foreign key.
    pub fn detect_conventions(mut self, detect: bool) -> Self {
        self.detect_conventions = detect;
        self
    }

    /// Resolve a relation's definitions in declaration order.
    pub fn resolve(&self, definitions: &[AssociationDefinition]) -> Result<ResolvedAssociations> {
        let mut seen = HashSet::new();
        for definition in definitions {
            let name = definition.name();
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateAssociation {
                    relation: definition.source.clone(),
                    name,
                });
            }
        }

        let resolved = definitions
            .iter()
            .map(|definition| self.resolve_one(definition))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedAssociations::from_entries(resolved))
    }

    /// Resolve a single definition.
    pub fn resolve_one(&self, definition: &AssociationDefinition) -> Result<ResolvedAssociation> {
        let source = self.lookup(&definition.source)?;
        let target = self.lookup(&definition.target)?;

        let join = match definition.kind {
            AssociationKind::ManyToOne => {
                let mut conventions = Vec::new();
                if definition.is_aliased() {
                    conventions.push(format!(
                        "{}{}",
                        definition.name(),
                        self.naming.foreign_key_suffix
                    ));
                }
                let expected = naming::foreign_key_column(target.name(), &self.naming);
                conventions.push(expected.clone());
                self.direct(definition, source, target, &conventions, expected)?
            }
            AssociationKind::OneToMany | AssociationKind::OneToOne => {
                let expected = naming::foreign_key_column(source.name(), &self.naming);
                self.direct(definition, target, source, &[expected.clone()], expected)?
            }
            AssociationKind::ManyToMany | AssociationKind::OneToOneThrough => {
                self.through(definition, source, target)?
            }
        };

        let resolved = ResolvedAssociation {
            target: AssociationTarget {
                relation: definition.target.clone(),
                name: definition.name(),
                aliased: definition.is_aliased(),
            },
            definition: definition.clone(),
            join,
        };

        debug!(
            source = %definition.source,
            name = %resolved.name(),
            kind = %definition.kind,
            target = %definition.target,
            "Resolved association"
        );

        Ok(resolved)
    }

    fn lookup(&self, relation: &str) -> Result<&'a Schema> {
        self.schemas
            .schema(relation)
            .ok_or_else(|| Error::NoSuchRelation {
                relation: relation.to_string(),
            })
    }

    fn direct(
        &self,
        definition: &AssociationDefinition,
        owner: &Schema,
        parent: &Schema,
        conventions: &[String],
        expected: String,
    ) -> Result<JoinPath> {
        let bound = self
            .find_key(owner, parent, conventions, None)?
            .ok_or_else(|| Error::MissingForeignKey {
                source_relation: definition.source.clone(),
                target: definition.target.clone(),
                owner: owner.name().to_string(),
                parent: parent.name().to_string(),
                expected,
            })?;

        Ok(JoinPath::Direct {
            owner: owner.name().to_string(),
            foreign_key: bound.foreign_key,
            parent: parent.name().to_string(),
            parent_keys: bound.parent_keys,
        })
    }

    fn through(
        &self,
        definition: &AssociationDefinition,
        source: &Schema,
        target: &Schema,
    ) -> Result<JoinPath> {
        let source_expected = naming::foreign_key_column(source.name(), &self.naming);
        let Some(through_name) = definition.through.as_deref() else {
            return Err(Error::MissingJoinPath {
                source_relation: definition.source.clone(),
                target: definition.target.clone(),
                through: format!("{}_{}", definition.source, definition.target),
                missing: source.name().to_string(),
                expected: source_expected,
            });
        };
        let through = self.lookup(through_name)?;

        let missing = |parent: &Schema, expected: String| Error::MissingJoinPath {
            source_relation: definition.source.clone(),
            target: definition.target.clone(),
            through: through_name.to_string(),
            missing: parent.name().to_string(),
            expected,
        };

        let source_key = self
            .find_key(through, source, &[source_expected.clone()], None)?
            .ok_or_else(|| missing(source, source_expected))?;

        // A self-referencing join relation needs two distinct keys; the
        // association name disambiguates the target side (`friend_id`).
        let target_expected = naming::foreign_key_column(target.name(), &self.naming);
        let named = format!(
            "{}{}",
            naming::singularize(&definition.name()),
            self.naming.foreign_key_suffix
        );
        let conventions = if named == target_expected {
            vec![target_expected.clone()]
        } else {
            vec![named, target_expected.clone()]
        };
        let target_key = self
            .find_key(through, target, &conventions, Some(&source_key.foreign_key))?
            .ok_or_else(|| missing(target, target_expected))?;

        Ok(JoinPath::Through {
            through: through.name().to_string(),
            source_key: source_key.foreign_key,
            source_parent_keys: source_key.parent_keys,
            target_key: target_key.foreign_key,
            target_parent_keys: target_key.parent_keys,
        })
    }

    /// Find the foreign key on `owner` referencing `parent`.
    ///
    /// Declared keys win; among several, the one on a conventional column is
    /// preferred. Without a declared key, a conventional column is bound when
    /// convention detection is enabled and the column is not already part of
    /// a key to another relation. The bound key must cover every parent key
    /// column.
    fn find_key(
        &self,
        owner: &Schema,
        parent: &Schema,
        conventions: &[String],
        exclude: Option<&ForeignKeyDescriptor>,
    ) -> Result<Option<BoundKey>> {
        let candidates: Vec<&ForeignKeyDescriptor> = owner
            .foreign_keys_to(parent.name())
            .into_iter()
            .filter(|fk| Some(*fk) != exclude)
            .collect();

        let declared = conventions
            .iter()
            .find_map(|column| candidates.iter().find(|fk| fk.is_on(column)))
            .or_else(|| candidates.first())
            .map(|fk| (*fk).clone());

        let foreign_key = match declared {
            Some(fk) => fk,
            None if self.detect_conventions => {
                let excluded: Vec<&str> = exclude.map(|fk| fk.column_names()).unwrap_or_default();
                let detected = conventions
                    .iter()
                    .filter(|column| !excluded.contains(&column.as_str()))
                    .filter(|column| owner.foreign_key_for(column).is_none())
                    .find_map(|column| owner.attribute(column));
                match detected {
                    Some(attr) => ForeignKeyDescriptor::new(vec![attr.clone()], parent.name()),
                    None => return Ok(None),
                }
            }
            None => return Ok(None),
        };

        let parent_keys = if foreign_key.parent_keys.is_empty() {
            parent.primary_key_names()
        } else {
            foreign_key.parent_keys.clone()
        };
        if parent_keys.is_empty() {
            return Err(Error::MissingPrimaryKey {
                relation: parent.name().to_string(),
            });
        }
        if foreign_key.attributes.len() != parent_keys.len() {
            return Err(Error::ForeignKeyArity {
                owner: owner.name().to_string(),
                columns: foreign_key.column_names().into_iter().map(String::from).collect(),
                parent: parent.name().to_string(),
                parent_keys,
            });
        }

        Ok(Some(BoundKey {
            foreign_key,
            parent_keys,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationDsl, Cardinality};
    use crate::schema::{AttributeDescriptor, SemanticType};

    fn id(relation: &str) -> AttributeDescriptor {
        AttributeDescriptor::new(relation, "id", SemanticType::Integer).with_primary_key()
    }

    fn column(relation: &str, name: &str) -> AttributeDescriptor {
        AttributeDescriptor::new(relation, name, SemanticType::Integer)
    }

    fn blog() -> Vec<Schema> {
        vec![
            Schema::new("users", vec![id("users")], vec![], vec![]).unwrap(),
            Schema::new(
                "posts",
                vec![id("posts"), column("posts", "user_id").with_references("users")],
                vec![],
                vec![],
            )
            .unwrap(),
            Schema::new("tags", vec![id("tags")], vec![], vec![]).unwrap(),
            Schema::new(
                "posts_tags",
                vec![
                    column("posts_tags", "post_id").with_references("posts"),
                    column("posts_tags", "tag_id").with_references("tags"),
                ],
                vec![],
                vec![],
            )
            .unwrap(),
            Schema::new("comments", vec![id("comments"), column("comments", "post_id")], vec![], vec![])
                .unwrap(),
        ]
    }

    fn definitions(source: &str, f: impl FnOnce(&mut AssociationDsl)) -> Vec<AssociationDefinition> {
        let mut dsl = AssociationDsl::new(source);
        f(&mut dsl);
        dsl.finish()
    }

    #[test]
    fn test_many_to_one_binds_source_foreign_key() {
        let schemas = blog();
        let resolver = AssociationResolver::new(schemas.as_slice());
        let resolved = resolver
            .resolve(&definitions("posts", |a| {
                a.belongs_to("user");
            }))
            .unwrap();

        let user = &resolved["user"];
        assert_eq!(user.join_columns(), vec![("posts.user_id".to_string(), "users.id".to_string())]);
        assert!(!user.target.aliased);
    }

    #[test]
    fn test_one_to_many_binds_inverse_foreign_key() {
        let schemas = blog();
        let resolved = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("users", |a| {
                a.has_many("posts");
            }))
            .unwrap();

        assert_eq!(
            resolved["posts"].join_columns(),
            vec![("users.id".to_string(), "posts.user_id".to_string())]
        );
    }

    #[test]
    fn test_convention_detection() {
        let schemas = blog();
        let definitions = definitions("posts", |a| {
            a.has_many("comments");
        });

        let resolved = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions)
            .unwrap();
        assert!(resolved.contains("comments"));

        let err = AssociationResolver::new(schemas.as_slice())
            .detect_conventions(false)
            .resolve(&definitions)
            .unwrap_err();
        assert!(matches!(err, Error::MissingForeignKey { ref expected, .. } if expected == "post_id"));
    }

    #[test]
    fn test_convention_column_keyed_to_other_relation() {
        let mut schemas = blog();
        schemas.push(Schema::new("accounts", vec![id("accounts")], vec![], vec![]).unwrap());
        schemas.push(
            Schema::new(
                "drafts",
                vec![id("drafts"), column("drafts", "user_id").with_references("accounts")],
                vec![],
                vec![],
            )
            .unwrap(),
        );

        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("drafts", |a| {
                a.belongs_to("user");
            }))
            .unwrap_err();

        match err {
            Error::MissingForeignKey {
                owner,
                parent,
                expected,
                ..
            } => {
                assert_eq!(owner, "drafts");
                assert_eq!(parent, "users");
                assert_eq!(expected, "user_id");
            }
            other => panic!("Expected MissingForeignKey, got {other:?}"),
        }
    }

    fn orders(items: AttributeDescriptor) -> Vec<Schema> {
        vec![
            Schema::new(
                "orders",
                vec![
                    column("orders", "region").with_primary_key(),
                    column("orders", "num").with_primary_key(),
                ],
                vec![],
                vec![],
            )
            .unwrap(),
            Schema::new("items", vec![id("items"), items], vec![], vec![]).unwrap(),
        ]
    }

    #[test]
    fn test_detected_key_against_composite_primary_key() {
        let schemas = orders(column("items", "order_id"));
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("items", |a| {
                a.belongs_to("order");
            }))
            .unwrap_err();

        match err {
            Error::ForeignKeyArity {
                owner,
                columns,
                parent,
                parent_keys,
            } => {
                assert_eq!(owner, "items");
                assert_eq!(columns, vec!["order_id".to_string()]);
                assert_eq!(parent, "orders");
                assert_eq!(parent_keys, vec!["region".to_string(), "num".to_string()]);
            }
            other => panic!("Expected ForeignKeyArity, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_key_against_composite_primary_key() {
        let schemas = orders(column("items", "order_id").with_references("orders"));
        let definitions = definitions("orders", |a| {
            a.has_many("items");
        });

        let err = AssociationResolver::new(schemas.as_slice())
            .detect_conventions(false)
            .resolve(&definitions)
            .unwrap_err();

        assert!(matches!(err, Error::ForeignKeyArity { ref owner, .. } if owner == "items"));
    }

    #[test]
    fn test_many_to_many_through() {
        let schemas = blog();
        let resolved = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.one_to_many("tags").through("posts_tags");
            }))
            .unwrap();

        assert_eq!(
            resolved["tags"].join_columns(),
            vec![
                ("posts.id".to_string(), "posts_tags.post_id".to_string()),
                ("posts_tags.tag_id".to_string(), "tags.id".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_join_path() {
        let schemas = blog();
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("users", |a| {
                a.one_to_many("tags").through("posts_tags");
            }))
            .unwrap_err();

        match err {
            Error::MissingJoinPath {
                missing, expected, ..
            } => {
                assert_eq!(missing, "users");
                assert_eq!(expected, "user_id");
            }
            other => panic!("Expected MissingJoinPath, got {other:?}"),
        }
    }

    fn covers() -> Vec<Schema> {
        let mut schemas = blog();
        schemas.push(Schema::new("covers", vec![id("covers")], vec![], vec![]).unwrap());
        schemas.push(
            Schema::new(
                "post_covers",
                vec![
                    column("post_covers", "post_id").with_references("posts"),
                    column("post_covers", "cover_id").with_references("covers"),
                ],
                vec![],
                vec![],
            )
            .unwrap(),
        );
        schemas.push(
            Schema::new(
                "post_images",
                vec![
                    column("post_images", "post_id").with_references("posts"),
                    column("post_images", "url"),
                ],
                vec![],
                vec![],
            )
            .unwrap(),
        );
        schemas
    }

    #[test]
    fn test_one_to_one_through() {
        let schemas = covers();
        let resolved = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.one_to_one("covers").through("post_covers");
            }))
            .unwrap();

        let cover = &resolved["cover"];
        assert_eq!(cover.kind(), AssociationKind::OneToOneThrough);
        assert_eq!(cover.cardinality(), Cardinality::One);
        assert_eq!(
            cover.join_columns(),
            vec![
                ("posts.id".to_string(), "post_covers.post_id".to_string()),
                ("post_covers.cover_id".to_string(), "covers.id".to_string()),
            ]
        );
    }

    #[test]
    fn test_one_to_one_through_missing_target_key() {
        let schemas = covers();
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.one_to_one("covers").through("post_images");
            }))
            .unwrap_err();

        match err {
            Error::MissingJoinPath {
                through,
                missing,
                expected,
                ..
            } => {
                assert_eq!(through, "post_images");
                assert_eq!(missing, "covers");
                assert_eq!(expected, "cover_id");
            }
            other => panic!("Expected MissingJoinPath, got {other:?}"),
        }
    }

    #[test]
    fn test_through_kind_without_join_relation() {
        let schemas = blog();
        let definition = AssociationDefinition::new(AssociationKind::ManyToMany, "posts", "tags");

        match AssociationResolver::new(schemas.as_slice())
            .resolve_one(&definition)
            .unwrap_err()
        {
            Error::MissingJoinPath {
                through,
                missing,
                expected,
                ..
            } => {
                assert_eq!(through, "posts_tags");
                assert_eq!(missing, "posts");
                assert_eq!(expected, "post_id");
            }
            other => panic!("Expected MissingJoinPath, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_target() {
        let schemas = blog();
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.has_many("reviews");
            }))
            .unwrap_err();

        assert!(matches!(err, Error::NoSuchRelation { ref relation } if relation == "reviews"));
    }

    #[test]
    fn test_duplicate_names() {
        let schemas = blog();
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.belongs_to("user");
                a.many_to_one("users");
            }))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateAssociation { ref name, .. } if name == "user"));
    }

    #[test]
    fn test_many_to_one_without_key() {
        let schemas = blog();
        let err = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("posts", |a| {
                a.belongs_to("tag");
            }))
            .unwrap_err();

        match err {
            Error::MissingForeignKey {
                source_relation,
                target,
                owner,
                expected,
                ..
            } => {
                assert_eq!(source_relation, "posts");
                assert_eq!(target, "tags");
                assert_eq!(owner, "posts");
                assert_eq!(expected, "tag_id");
            }
            other => panic!("Expected MissingForeignKey, got {other:?}"),
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schemas = blog();
        let definitions = definitions("posts", |a| {
            a.belongs_to("user");
            a.has_many("comments");
            a.one_to_many("tags").through("posts_tags");
        });
        let resolver = AssociationResolver::new(schemas.as_slice());

        let first = resolver.resolve(&definitions).unwrap();
        let second = resolver.resolve(&definitions).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.names(), vec!["user", "comments", "tags"]);
    }

    #[test]
    fn test_self_referencing_through() {
        let mut schemas = blog();
        schemas.push(
            Schema::new(
                "follows",
                vec![
                    column("follows", "user_id").with_references("users"),
                    column("follows", "follower_id").with_references("users"),
                ],
                vec![],
                vec![],
            )
            .unwrap(),
        );

        let resolved = AssociationResolver::new(schemas.as_slice())
            .resolve(&definitions("users", |a| {
                a.many_to_many("users").through("follows").alias("followers");
            }))
            .unwrap();

        let followers = &resolved["followers"];
        assert!(followers.target.is_aliased());
        assert_eq!(
            followers.join_columns(),
            vec![
                ("users.id".to_string(), "follows.user_id".to_string()),
                ("follows.follower_id".to_string(), "users.id".to_string()),
            ]
        );
    }
}
