//! Relation schema - attributes, indexes and foreign keys of one relation.

use super::{AttributeDescriptor, ForeignKeyDescriptor, IndexDescriptor};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Immutable structural description of one relation.
///
/// Attribute names are unique, and every attribute referenced by an index or
/// foreign key is the schema's own descriptor for that name. Attributes that
/// reference another relation always have a matching [`ForeignKeyDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    indexes: Vec<IndexDescriptor>,
    foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl Schema {
    /// Build a schema, validating and normalizing its descriptors.
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<AttributeDescriptor>,
        indexes: Vec<IndexDescriptor>,
        foreign_keys: Vec<ForeignKeyDescriptor>,
    ) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        for attr in &attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(Error::DuplicateAttribute {
                    relation: name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }

        let mut schema = Self {
            name,
            attributes,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        };

        // Columns covered by a constraint point at its parent.
        for fk in &foreign_keys {
            for column in fk.column_names() {
                if let Some(attr) = schema.attributes.iter_mut().find(|a| a.name == column) {
                    if attr.references.is_none() {
                        attr.references = Some(fk.parent_table.clone());
                    }
                }
            }
        }

        let mut foreign_keys = foreign_keys;
        for attr in &schema.attributes {
            let Some(parent) = &attr.references else {
                continue;
            };
            let covered = foreign_keys.iter().any(|fk| {
                fk.references(parent) && fk.attributes.iter().any(|a| a.name == attr.name)
            });
            if !covered {
                foreign_keys.push(ForeignKeyDescriptor::new(vec![attr.clone()], parent.clone()));
            }
        }

        for mut fk in foreign_keys {
            fk.attributes = schema.bind(&fk.attributes)?;
            if !schema.foreign_keys.contains(&fk) {
                schema.foreign_keys.push(fk);
            }
        }

        for mut index in indexes {
            index.attributes = schema.bind(&index.attributes)?;
            if !schema.indexes.contains(&index) {
                schema.indexes.push(index);
            }
        }

        Ok(schema)
    }

    /// A schema with no attributes.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Replace descriptors with this schema's own attribute of the same name.
    fn bind(&self, attributes: &[AttributeDescriptor]) -> Result<Vec<AttributeDescriptor>> {
        attributes
            .iter()
            .map(|a| {
                self.attribute(&a.name)
                    .cloned()
                    .ok_or_else(|| Error::UnknownAttribute {
                        relation: self.name.clone(),
                        attribute: a.name.clone(),
                    })
            })
            .collect()
    }

    /// Relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Index descriptors.
    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    /// Foreign key descriptors.
    pub fn foreign_keys(&self) -> &[ForeignKeyDescriptor] {
        &self.foreign_keys
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if the schema has an attribute with this name.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Primary key attributes in declaration order.
    pub fn primary_key(&self) -> Vec<&AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.primary_key).collect()
    }

    /// Primary key column names in declaration order.
    pub fn primary_key_names(&self) -> Vec<String> {
        self.primary_key().into_iter().map(|a| a.name.clone()).collect()
    }

    /// Foreign keys referencing `relation`.
    pub fn foreign_keys_to(&self, relation: &str) -> Vec<&ForeignKeyDescriptor> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.references(relation))
            .collect()
    }

    /// The foreign key a column participates in, if any.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKeyDescriptor> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.attributes.iter().any(|a| a.name == column))
    }

    /// Get an index by its declared name.
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes
            .iter()
            .find(|i| i.name.as_deref() == Some(name))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SemanticType;

    fn attr(name: &str, ty: SemanticType) -> AttributeDescriptor {
        AttributeDescriptor::new("comments", name, ty)
    }

    fn comments() -> Schema {
        Schema::new(
            "comments",
            vec![
                attr("id", SemanticType::Integer).with_primary_key(),
                attr("post_id", SemanticType::Integer).with_references("posts"),
                attr("body", SemanticType::Text),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let schema = comments();

        assert_eq!(schema.name(), "comments");
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.attribute_names(), vec!["id", "post_id", "body"]);
        assert_eq!(schema.primary_key_names(), vec!["id".to_string()]);
        assert!(schema.has_attribute("body"));
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn test_reference_synthesizes_foreign_key() {
        let schema = comments();

        assert_eq!(schema.foreign_keys().len(), 1);
        let fk = &schema.foreign_keys()[0];
        assert_eq!(fk.parent_table, "posts");
        assert_eq!(fk.attributes[0].name, "post_id");
        assert_eq!(schema.foreign_keys_to("posts").len(), 1);
        assert!(schema.foreign_key_for("post_id").is_some());
    }

    #[test]
    fn test_declared_foreign_key_marks_attribute() {
        let schema = Schema::new(
            "comments",
            vec![
                attr("id", SemanticType::Integer),
                attr("author_id", SemanticType::Integer),
            ],
            vec![],
            vec![ForeignKeyDescriptor::new(
                vec![attr("author_id", SemanticType::Integer)],
                "users",
            )],
        )
        .unwrap();

        assert_eq!(schema.foreign_keys().len(), 1);
        assert_eq!(
            schema.attribute("author_id").unwrap().references.as_deref(),
            Some("users")
        );
        assert_eq!(
            schema.foreign_keys()[0].attributes[0],
            *schema.attribute("author_id").unwrap()
        );
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = Schema::new(
            "comments",
            vec![attr("id", SemanticType::Integer), attr("id", SemanticType::Text)],
            vec![],
            vec![],
        )
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateAttribute { ref attribute, .. } if attribute == "id"));
    }

    #[test]
    fn test_unknown_index_attribute_rejected() {
        let err = Schema::new(
            "comments",
            vec![attr("id", SemanticType::Integer)],
            vec![IndexDescriptor::new(vec![attr("title", SemanticType::String)])],
            vec![],
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownAttribute { ref attribute, .. } if attribute == "title"));
    }

    #[test]
    fn test_duplicate_indexes_collapse() {
        let index = IndexDescriptor::new(vec![attr("body", SemanticType::Text)]);
        let schema = Schema::new(
            "comments",
            vec![attr("body", SemanticType::Text)],
            vec![index.clone(), index],
            vec![],
        )
        .unwrap();

        assert_eq!(schema.indexes().len(), 1);
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::empty("nothing");
        assert!(schema.is_empty());
        assert!(schema.primary_key().is_empty());
    }
}
