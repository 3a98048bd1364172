//! Semantic attribute types.

use serde::{Deserialize, Serialize};

/// Engine-independent type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Boolean value.
    Boolean,
    /// 32-bit (or engine-default) integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Floating point number.
    Float,
    /// Fixed-precision decimal.
    Decimal,
    /// Bounded string.
    String,
    /// Unbounded text.
    Text,
    /// Binary data.
    Binary,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
    /// UUID (128-bit identifier).
    Uuid,
    /// JSON document.
    Json,
    /// Best-effort generic type for columns without a mapping.
    Any,
}

impl SemanticType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Integer | SemanticType::BigInt | SemanticType::Float | SemanticType::Decimal
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(self, SemanticType::String | SemanticType::Text)
    }

    /// Check if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SemanticType::Date | SemanticType::Time | SemanticType::DateTime
        )
    }

    /// Lowercase name used in output and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Boolean => "boolean",
            SemanticType::Integer => "integer",
            SemanticType::BigInt => "big_int",
            SemanticType::Float => "float",
            SemanticType::Decimal => "decimal",
            SemanticType::String => "string",
            SemanticType::Text => "text",
            SemanticType::Binary => "binary",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::DateTime => "date_time",
            SemanticType::Uuid => "uuid",
            SemanticType::Json => "json",
            SemanticType::Any => "any",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_type_checks() {
        assert!(SemanticType::Integer.is_numeric());
        assert!(SemanticType::Decimal.is_numeric());
        assert!(!SemanticType::String.is_numeric());

        assert!(SemanticType::Text.is_string_like());
        assert!(!SemanticType::Binary.is_string_like());

        assert!(SemanticType::DateTime.is_temporal());
        assert!(!SemanticType::Uuid.is_temporal());
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&SemanticType::DateTime).unwrap();
        assert_eq!(json, "\"date_time\"");
        assert_eq!(SemanticType::DateTime.to_string(), "date_time");

        let parsed: SemanticType = serde_json::from_str("\"big_int\"").unwrap();
        assert_eq!(parsed, SemanticType::BigInt);
    }
}
