//! Schema inference from catalog metadata.

use super::catalog::{CatalogSource, ColumnInfo, ForeignKeyRow, IndexRow};
use crate::config::{InferenceConfig, NamingConventions};
use crate::error::{Error, Result, UnsupportedType};
use crate::naming;
use crate::schema::{
    AttributeDescriptor, ForeignKeyDescriptor, IndexDescriptor, Schema, SemanticType,
};
use tracing::{debug, instrument, warn};

/// An inferred schema and the columns that were degraded to
/// [`SemanticType::Any`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inferred {
    /// The inferred schema.
    pub schema: Schema,
    /// Columns whose native type had no mapping.
    pub degraded: Vec<UnsupportedType>,
}

impl Inferred {
    /// Check if any column was degraded.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Turns catalog metadata into [`Schema`]s.
pub struct SchemaInferrer<C> {
    catalog: C,
    config: InferenceConfig,
}

impl<C: CatalogSource> SchemaInferrer<C> {
    /// Create an inferrer over a catalog connection.
    pub fn new(catalog: C, config: InferenceConfig) -> Self {
        Self { catalog, config }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The inference configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the schema of one relation.
    ///
    /// A relation without catalog entry fails with
    /// [`Error::NoSuchRelation`]; a relation with zero columns yields an
    /// empty schema.
    #[instrument(skip(self), fields(engine = %self.catalog.engine()))]
    pub fn infer(&self, relation: &str) -> Result<Inferred> {
        if !self.catalog.relation_exists(relation)? {
            return Err(Error::NoSuchRelation {
                relation: relation.to_string(),
            });
        }

        let columns = self.catalog.columns(relation)?;
        let (attributes, degraded) = self.attributes(relation, &columns)?;
        let foreign_keys = group_foreign_keys(relation, &attributes, self.catalog.foreign_keys(relation)?);
        let indexes = group_indexes(
            relation,
            &attributes,
            &self.config.naming,
            self.catalog.indexes(relation)?,
        );

        let schema = Schema::new(relation, attributes, indexes, foreign_keys)?;

        debug!(
            relation = %relation,
            attributes = schema.len(),
            indexes = schema.indexes().len(),
            foreign_keys = schema.foreign_keys().len(),
            degraded = degraded.len(),
            "Inferred schema"
        );

        Ok(Inferred { schema, degraded })
    }

    /// Infer every relation the catalog lists, in catalog order.
    pub fn infer_all(&self) -> Result<Vec<Inferred>> {
        self.catalog
            .relation_names()?
            .iter()
            .map(|relation| self.infer(relation))
            .collect()
    }

    fn attributes(
        &self,
        relation: &str,
        columns: &[ColumnInfo],
    ) -> Result<(Vec<AttributeDescriptor>, Vec<UnsupportedType>)> {
        let mut attributes = Vec::with_capacity(columns.len());
        let mut degraded = Vec::new();

        for column in columns {
            let ty = match self.config.types.lookup(&column.native_type) {
                Some(ty) => ty,
                None => {
                    let unsupported = UnsupportedType {
                        relation: relation.to_string(),
                        column: column.name.clone(),
                        native_type: column.native_type.clone(),
                    };
                    if self.config.strict_types {
                        return Err(unsupported.into());
                    }
                    warn!(
                        relation = %relation,
                        column = %column.name,
                        native_type = %column.native_type,
                        "Unsupported column type, degrading to any"
                    );
                    degraded.push(unsupported);
                    SemanticType::Any
                }
            };

            let mut attr = AttributeDescriptor::new(relation, &column.name, ty)
                .with_nullable(column.nullable);
            if column.primary_key_position.is_some() {
                attr = attr.with_primary_key();
            }
            if let Some(default) = &column.default {
                attr = attr.with_default(default);
            }
            attributes.push(attr);
        }

        Ok((attributes, degraded))
    }
}

/// Group index rows by index name. Anonymous rows each become a
/// single-column index with a synthesized name, never merged with a named
/// index.
fn group_indexes(
    relation: &str,
    attributes: &[AttributeDescriptor],
    naming_conventions: &NamingConventions,
    mut rows: Vec<IndexRow>,
) -> Vec<IndexDescriptor> {
    rows.sort_by_key(|row| row.position);

    let mut groups: Vec<(Option<String>, Vec<IndexRow>)> = Vec::new();
    for row in rows {
        let existing = row
            .index
            .as_deref()
            .and_then(|name| groups.iter().position(|(n, _)| n.as_deref() == Some(name)));
        match existing {
            Some(i) => groups[i].1.push(row),
            None => groups.push((row.index.clone(), vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let name = name.unwrap_or_else(|| {
                naming::index_name(relation, &[&members[0].column], naming_conventions)
            });
            let unique = members.iter().any(|r| r.unique);
            let kind = members.iter().find_map(|r| r.method.clone());
            let columns = members.iter().map(|r| lookup(relation, attributes, &r.column)).collect();

            let mut index = IndexDescriptor::new(columns)
                .with_name(name)
                .with_unique(unique);
            if let Some(kind) = kind {
                index = index.with_kind(kind);
            }
            index
        })
        .collect()
}

/// Group foreign-key rows by constraint, keeping constraint order of first
/// appearance and column order within each constraint.
fn group_foreign_keys(
    relation: &str,
    attributes: &[AttributeDescriptor],
    mut rows: Vec<ForeignKeyRow>,
) -> Vec<ForeignKeyDescriptor> {
    rows.sort_by_key(|row| row.position);

    let mut groups: Vec<(String, Vec<ForeignKeyRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(c, _)| *c == row.constraint) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.constraint.clone(), vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(constraint, members)| {
            let columns = members
                .iter()
                .map(|r| lookup(relation, attributes, &r.column))
                .collect();
            let parent_table = members[0].parent_table.clone();
            let parent_keys: Option<Vec<String>> =
                members.iter().map(|r| r.parent_column.clone()).collect();

            ForeignKeyDescriptor::new(columns, parent_table)
                .with_name(constraint)
                .with_parent_keys(parent_keys.unwrap_or_default())
        })
        .collect()
}

/// The attribute for `column`, or a placeholder that schema validation
/// rejects as unknown.
fn lookup(relation: &str, attributes: &[AttributeDescriptor], column: &str) -> AttributeDescriptor {
    attributes
        .iter()
        .find(|a| a.name == column)
        .cloned()
        .unwrap_or_else(|| AttributeDescriptor::new(relation, column, SemanticType::Any))
}
