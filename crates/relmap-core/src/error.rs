//! Core error types.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A catalog column whose native type has no semantic mapping.
///
/// Inference reports this as a degradation next to the produced schema; the
/// attribute itself is still emitted with [`SemanticType::Any`](crate::SemanticType::Any).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported type {native_type:?} for column {relation}.{column}")]
pub struct UnsupportedType {
    /// Relation owning the column.
    pub relation: String,
    /// Column name.
    pub column: String,
    /// Native type as reported by the catalog.
    pub native_type: String,
}

/// Schema and association errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A native column type could not be mapped (fatal only in strict mode).
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedType),

    /// The catalog holds no entry for the relation.
    #[error("no such relation: {relation}")]
    NoSuchRelation {
        /// The relation that was looked up.
        relation: String,
    },

    /// Two declarations in one relation resolve to the same association name.
    #[error("duplicate association {name:?} in relation {relation}")]
    DuplicateAssociation {
        /// Relation declaring the associations.
        relation: String,
        /// The colliding effective name.
        name: String,
    },

    /// A direct association found no foreign key to bind to.
    #[error(
        "missing foreign key for association {source_relation} -> {target}: \
         no foreign key on {owner} references {parent} (expected column {expected:?})"
    )]
    MissingForeignKey {
        /// Relation declaring the association.
        source_relation: String,
        /// Target relation of the association.
        target: String,
        /// Relation expected to hold the foreign key.
        owner: String,
        /// Relation the foreign key should reference.
        parent: String,
        /// Column name the naming convention expects.
        expected: String,
    },

    /// A through association's join relation lacks one of its two foreign keys.
    #[error(
        "missing join path for association {source_relation} -> {target} through {through}: \
         no foreign key references {missing} (expected column {expected:?})"
    )]
    MissingJoinPath {
        /// Relation declaring the association.
        source_relation: String,
        /// Target relation of the association.
        target: String,
        /// The join relation.
        through: String,
        /// Relation the missing foreign key should reference.
        missing: String,
        /// Column name the naming convention expects.
        expected: String,
    },

    /// A referenced relation has no primary key to join against.
    #[error("relation {relation} has no primary key")]
    MissingPrimaryKey {
        /// The relation without a primary key.
        relation: String,
    },

    /// A foreign key's column count differs from the key it references.
    #[error("foreign key {owner}{columns:?} does not match key {parent}{parent_keys:?}")]
    ForeignKeyArity {
        /// Relation holding the foreign key.
        owner: String,
        /// Foreign key columns.
        columns: Vec<String>,
        /// Referenced relation.
        parent: String,
        /// Referenced key columns.
        parent_keys: Vec<String>,
    },

    /// An attribute name appears twice in one schema.
    #[error("duplicate attribute {attribute:?} in relation {relation}")]
    DuplicateAttribute {
        /// The relation being declared.
        relation: String,
        /// The repeated attribute name.
        attribute: String,
    },

    /// An index or foreign key names an attribute the schema does not have.
    #[error("unknown attribute {attribute:?} in relation {relation}")]
    UnknownAttribute {
        /// The relation being declared.
        relation: String,
        /// The missing attribute name.
        attribute: String,
    },

    /// Failure reported by the catalog connection.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Configuration could not be decoded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Catalog(err.to_string())
    }
}

impl Error {
    /// The relation this error is about, when there is one.
    pub fn relation(&self) -> Option<&str> {
        match self {
            Error::UnsupportedType(e) => Some(&e.relation),
            Error::NoSuchRelation { relation }
            | Error::DuplicateAssociation { relation, .. }
            | Error::MissingPrimaryKey { relation }
            | Error::DuplicateAttribute { relation, .. }
            | Error::UnknownAttribute { relation, .. } => Some(relation),
            Error::ForeignKeyArity { owner, .. } => Some(owner),
            Error::MissingForeignKey {
                source_relation, ..
            }
            | Error::MissingJoinPath {
                source_relation, ..
            } => Some(source_relation),
            Error::Catalog(_) | Error::Config(_) | Error::Io(_) => None,
        }
    }
}
