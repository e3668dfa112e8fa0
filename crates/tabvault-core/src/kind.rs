//! Portable scalar kinds and the native type mapper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of scalar kinds an artifact field can carry.
///
/// Everything that is not integral, floating point or boolean travels as text,
/// timestamps and decimals included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortableKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl PortableKind {
    /// Map a native column type tag to its portable kind.
    ///
    /// Tags compare case-insensitively after dropping a parenthesised size and an
    /// `unsigned` qualifier. Unknown tags map to [`PortableKind::Text`].
    ///
    /// ```rust
    /// use tabvault_core::PortableKind;
    ///
    /// assert_eq!(PortableKind::from_native_type("INTEGER"), PortableKind::Integer);
    /// assert_eq!(PortableKind::from_native_type("VARCHAR(50)"), PortableKind::Text);
    /// assert_eq!(PortableKind::from_native_type("double precision"), PortableKind::Float);
    /// assert_eq!(PortableKind::from_native_type("DATETIME"), PortableKind::Text);
    /// ```
    pub fn from_native_type(tag: &str) -> Self {
        let normalized = normalize_tag(tag);
        match normalized.as_str() {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "mediumint" | "int2"
            | "int4" | "int8" | "int32" | "int64" | "long" => Self::Integer,
            "real" | "float" | "double" | "double precision" | "float32" | "float64" => {
                Self::Float
            }
            "bool" | "boolean" | "bit" => Self::Boolean,
            _ => Self::Text,
        }
    }

    /// Avro primitive type name used when writing this kind.
    pub fn avro_type(&self) -> &'static str {
        match self {
            Self::Integer => "long",
            Self::Float => "double",
            Self::Boolean => "boolean",
            Self::Text => "string",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for PortableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_tag(tag: &str) -> String {
    let base = match tag.find('(') {
        Some(open) => &tag[..open],
        None => tag,
    };
    base.split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("unsigned"))
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
