//! Association discovery from foreign keys.
//!
//! Used to propose associations for relations that declare none: every
//! foreign key yields a many-to-one on its owner and the inverse one-to-many
//! on its parent, and pure join relations yield many-to-many pairs.

use super::definition::{AssociationDefinition, AssociationKind};
use crate::config::NamingConventions;
use crate::schema::Schema;
use std::collections::BTreeMap;

/// Propose association definitions per source relation.
///
/// Names never collide within one relation: later proposals with an already
/// used name are dropped.
pub fn suggest_associations(
    schemas: &[Schema],
    naming: &NamingConventions,
) -> BTreeMap<String, Vec<AssociationDefinition>> {
    let mut suggestions: BTreeMap<String, Vec<AssociationDefinition>> = BTreeMap::new();
    let mut push = |definition: AssociationDefinition| {
        let entry = suggestions.entry(definition.source.clone()).or_default();
        if !entry.iter().any(|d| d.name() == definition.name()) {
            entry.push(definition);
        }
    };

    for schema in schemas {
        for fk in schema.foreign_keys() {
            let mut many_to_one =
                AssociationDefinition::new(AssociationKind::ManyToOne, schema.name(), &fk.parent_table);
            if let [attr] = fk.attributes.as_slice() {
                if let Some(stem) = attr.name.strip_suffix(naming.foreign_key_suffix.as_str()) {
                    if !stem.is_empty() && stem != many_to_one.natural_name() {
                        many_to_one = many_to_one.with_alias(stem);
                    }
                }
            }
            push(many_to_one);

            if !is_join_relation(schema) {
                push(AssociationDefinition::new(
                    AssociationKind::OneToMany,
                    &fk.parent_table,
                    schema.name(),
                ));
            }
        }

        if is_join_relation(schema) {
            let parents: Vec<&str> = schema
                .foreign_keys()
                .iter()
                .map(|fk| fk.parent_table.as_str())
                .collect();
            for (i, left) in parents.iter().enumerate() {
                for (j, right) in parents.iter().enumerate() {
                    if i != j && left != right {
                        push(
                            AssociationDefinition::new(AssociationKind::ManyToMany, *left, *right)
                                .with_through(schema.name()),
                        );
                    }
                }
            }
        }
    }

    suggestions
}

/// A relation whose every attribute is part of the primary key or of a
/// foreign key, with at least two foreign keys.
fn is_join_relation(schema: &Schema) -> bool {
    schema.foreign_keys().len() >= 2
        && schema
            .attributes()
            .iter()
            .all(|a| a.primary_key || schema.foreign_key_for(&a.name).is_some())
}
