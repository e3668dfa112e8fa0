//! Plain SQL identifiers.
//!
//! Table, view and column names end up spliced into statement text, so every
//! name that reaches a statement is parsed into a [`SqlIdentifier`] first. The
//! accepted shape, `[A-Za-z_][A-Za-z0-9_]*`, is also the shape of an Avro name,
//! which lets the same type guard artifact schemas.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Maximum length for identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Why a string was rejected as an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The identifier string is empty
    Empty,
    /// The identifier exceeds the maximum length
    TooLong { length: usize, max: usize },
    /// The first character is a digit
    LeadingDigit,
    /// Characters outside ASCII letters, digits and underscore
    InvalidCharacters,
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "identifier too long ({} chars, max {})", length, max)
            }
            Self::LeadingDigit => write!(f, "identifier cannot start with a digit"),
            Self::InvalidCharacters => write!(
                f,
                "identifier can only contain ASCII letters, digits and underscores"
            ),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// A validated table, view or column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Parse and validate an identifier.
    ///
    /// ```rust
    /// use tabvault_core::SqlIdentifier;
    ///
    /// assert!(SqlIdentifier::parse("hired_employees").is_ok());
    /// assert!(SqlIdentifier::parse("vw_HiredNumberOverMean2021").is_ok());
    /// assert!(SqlIdentifier::parse("jobs; DROP TABLE jobs").is_err());
    /// assert!(SqlIdentifier::parse("1jobs").is_err());
    /// ```
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref();
        Self::check(raw)
            .map(|()| Self(raw.to_string()))
            .map_err(|reason| CoreError::InvalidIdentifier {
                identifier: raw.to_string(),
                reason,
            })
    }

    /// Validate without allocating.
    pub fn check(raw: &str) -> Result<(), IdentifierError> {
        let Some(first) = raw.chars().next() else {
            return Err(IdentifierError::Empty);
        };

        if raw.len() > MAX_IDENTIFIER_LENGTH {
            return Err(IdentifierError::TooLong {
                length: raw.len(),
                max: MAX_IDENTIFIER_LENGTH,
            });
        }

        if first.is_ascii_digit() {
            return Err(IdentifierError::LeadingDigit);
        }

        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(IdentifierError::InvalidCharacters);
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for statement text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SqlIdentifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::check(&value)
            .map(|()| Self(value.clone()))
            .map_err(|reason| CoreError::InvalidIdentifier {
                identifier: value,
                reason,
            })
    }
}

impl From<SqlIdentifier> for String {
    fn from(id: SqlIdentifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jobs")]
    #[case("_private")]
    #[case("numberHired")]
    #[case("vw_HiredNumberOverMean2021")]
    fn test_valid_identifiers(#[case] raw: &str) {
        let id = SqlIdentifier::parse(raw).unwrap();
        assert_eq!(id.as_str(), raw);
        assert_eq!(id.quoted(), format!("\"{raw}\""));
    }

    #[rstest]
    #[case("", IdentifierError::Empty)]
    #[case("2021_hires", IdentifierError::LeadingDigit)]
    #[case("jobs;--", IdentifierError::InvalidCharacters)]
    #[case("hired employees", IdentifierError::InvalidCharacters)]
    #[case("jobs\"", IdentifierError::InvalidCharacters)]
    #[case("départements", IdentifierError::InvalidCharacters)]
    fn test_invalid_identifiers(#[case] raw: &str, #[case] expected: IdentifierError) {
        assert_eq!(SqlIdentifier::check(raw), Err(expected));
    }

    #[test]
    fn test_too_long_identifier() {
        let raw = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let error = SqlIdentifier::parse(&raw).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_serde_rejects_invalid_identifier() {
        let ok: SqlIdentifier = serde_json::from_str(r#""departments""#).unwrap();
        assert_eq!(ok.as_str(), "departments");
        assert!(serde_json::from_str::<SqlIdentifier>(r#""drop table""#).is_err());
    }
}
