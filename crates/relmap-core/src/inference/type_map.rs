//! Native-type to semantic-type mapping tables.

use crate::schema::SemanticType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STANDARD_TYPES: &[(&str, SemanticType)] = &[
    ("boolean", SemanticType::Boolean),
    ("bool", SemanticType::Boolean),
    ("integer", SemanticType::Integer),
    ("int", SemanticType::Integer),
    ("int2", SemanticType::Integer),
    ("int4", SemanticType::Integer),
    ("smallint", SemanticType::Integer),
    ("tinyint", SemanticType::Integer),
    ("mediumint", SemanticType::Integer),
    ("serial", SemanticType::Integer),
    ("bigint", SemanticType::BigInt),
    ("int8", SemanticType::BigInt),
    ("bigserial", SemanticType::BigInt),
    ("real", SemanticType::Float),
    ("float", SemanticType::Float),
    ("float4", SemanticType::Float),
    ("float8", SemanticType::Float),
    ("double", SemanticType::Float),
    ("double precision", SemanticType::Float),
    ("decimal", SemanticType::Decimal),
    ("numeric", SemanticType::Decimal),
    ("money", SemanticType::Decimal),
    ("varchar", SemanticType::String),
    ("character varying", SemanticType::String),
    ("char", SemanticType::String),
    ("character", SemanticType::String),
    ("nvarchar", SemanticType::String),
    ("nchar", SemanticType::String),
    ("text", SemanticType::Text),
    ("clob", SemanticType::Text),
    ("tinytext", SemanticType::Text),
    ("mediumtext", SemanticType::Text),
    ("longtext", SemanticType::Text),
    ("blob", SemanticType::Binary),
    ("bytea", SemanticType::Binary),
    ("binary", SemanticType::Binary),
    ("varbinary", SemanticType::Binary),
    ("date", SemanticType::Date),
    ("time", SemanticType::Time),
    ("timetz", SemanticType::Time),
    ("time without time zone", SemanticType::Time),
    ("time with time zone", SemanticType::Time),
    ("datetime", SemanticType::DateTime),
    ("timestamp", SemanticType::DateTime),
    ("timestamptz", SemanticType::DateTime),
    ("timestamp without time zone", SemanticType::DateTime),
    ("timestamp with time zone", SemanticType::DateTime),
    ("uuid", SemanticType::Uuid),
    ("json", SemanticType::Json),
    ("jsonb", SemanticType::Json),
];

/// Engine-specific table mapping native column types to [`SemanticType`]s.
///
/// Keys are normalized: lowercase, length/precision parameters removed and
/// whitespace collapsed, so `VARCHAR(255)` and `varchar` share an entry.
/// A table loaded from configuration replaces the defaults entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMapping {
    /// Normalized native type name to semantic type.
    pub entries: BTreeMap<String, SemanticType>,
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeMapping {
    /// An empty mapping; every lookup fails.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Common SQL type names shared by the mainstream engines.
    pub fn standard() -> Self {
        let mut mapping = Self::empty();
        for (native, semantic) in STANDARD_TYPES {
            mapping.entries.insert((*native).to_string(), *semantic);
        }
        mapping
    }

    /// SQLite mapping. Columns declared without a type are accepted as `Any`.
    pub fn sqlite() -> Self {
        Self::standard().with_type("", SemanticType::Any)
    }

    /// PostgreSQL mapping.
    pub fn postgres() -> Self {
        Self::standard()
            .with_type("citext", SemanticType::Text)
            .with_type("inet", SemanticType::String)
            .with_type("cidr", SemanticType::String)
            .with_type("macaddr", SemanticType::String)
    }

    /// Add or replace a mapping entry.
    pub fn with_type(mut self, native: &str, semantic: SemanticType) -> Self {
        self.entries.insert(normalize(native), semantic);
        self
    }

    /// Look up the semantic type for a native type name.
    pub fn lookup(&self, native: &str) -> Option<SemanticType> {
        self.entries.get(&normalize(native)).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a native type name for lookup.
fn normalize(native: &str) -> String {
    let mut stripped = String::with_capacity(native.len());
    let mut depth = 0usize;
    for c in native.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("VARCHAR(255)"), "varchar");
        assert_eq!(normalize("numeric(10, 2)"), "numeric");
        assert_eq!(
            normalize("timestamp(6)  WITH time zone"),
            "timestamp with time zone"
        );
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_standard_lookup() {
        let types = TypeMapping::standard();

        assert_eq!(types.lookup("INTEGER"), Some(SemanticType::Integer));
        assert_eq!(types.lookup("varchar(40)"), Some(SemanticType::String));
        assert_eq!(types.lookup("Double Precision"), Some(SemanticType::Float));
        assert_eq!(types.lookup("geometry"), None);
        assert_eq!(types.lookup(""), None);
    }

    #[test]
    fn test_engine_presets() {
        assert_eq!(TypeMapping::sqlite().lookup(""), Some(SemanticType::Any));
        assert_eq!(
            TypeMapping::postgres().lookup("CITEXT"),
            Some(SemanticType::Text)
        );
        assert_eq!(TypeMapping::sqlite().lookup("citext"), None);
    }

    #[test]
    fn test_custom_entry() {
        let types = TypeMapping::empty().with_type("Geometry(Point)", SemanticType::Binary);

        assert_eq!(types.len(), 1);
        assert_eq!(types.lookup("GEOMETRY"), Some(SemanticType::Binary));
        assert!(TypeMapping::empty().is_empty());
    }
}
