//! Scalar values and records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::kind::PortableKind;

/// One field value. `Null` is allowed for any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Kind of a non-null value.
    pub fn kind(&self) -> Option<PortableKind> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(PortableKind::Boolean),
            Self::Integer(_) => Some(PortableKind::Integer),
            Self::Float(_) => Some(PortableKind::Float),
            Self::Text(_) => Some(PortableKind::Text),
        }
    }

    /// Name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Conform a value to a field kind where the conversion is lossless.
    ///
    /// Values that cannot be conformed are returned unchanged; the codec rejects
    /// them later with an encoding error.
    pub fn canonicalize(self, kind: PortableKind) -> Self {
        match (kind, self) {
            (PortableKind::Text, Self::Integer(i)) => Self::Text(i.to_string()),
            (PortableKind::Text, Self::Float(f)) => Self::Text(f.to_string()),
            (PortableKind::Text, Self::Boolean(b)) => Self::Text(b.to_string()),
            (PortableKind::Boolean, Self::Integer(0)) => Self::Boolean(false),
            (PortableKind::Boolean, Self::Integer(1)) => Self::Boolean(true),
            (PortableKind::Float, Self::Integer(i)) => Self::Float(i as f64),
            (_, value) => value,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A mapping from field name to value.
///
/// ```rust
/// use tabvault_core::{Record, Scalar};
///
/// let record = Record::new().with("id", 1).with("department", "Sales");
/// assert_eq!(record.get("id"), Some(&Scalar::Integer(1)));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Scalar>);

impl Record {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Scalar);
    type IntoIter = std::collections::btree_map::IntoIter<String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
