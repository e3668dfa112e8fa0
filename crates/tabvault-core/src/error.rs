//! Error taxonomy shared by every Tabvault crate.
//!
//! [`ErrorKind`] is the stable, machine-readable classification that travels all
//! the way to HTTP responses. [`CoreError`] covers the failures that can happen
//! without a database connection: naming, validation, encoding and artifact I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::IdentifierError;

/// Type-safe classification of every failure Tabvault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Store unreachable or login rejected
    ConnectionError,
    /// Table identity outside the fixed catalog
    UnknownTable,
    /// Source query returned zero rows
    EmptyResult,
    /// Artifact decoded to zero records
    EmptyArtifact,
    /// Artifact framing or schema header unreadable
    CorruptArtifact,
    /// Artifact file name does not follow `{table}_backup.avro`
    InvalidArtifactName,
    /// Artifact file does not exist
    ArtifactNotFound,
    /// Value incompatible with its declared kind
    EncodingError,
    /// Artifact destination not writable
    WriteError,
    /// Transactional insert failed and was rolled back
    BatchInsertError,
    /// A record failed layout validation
    InvalidRecord,
    /// A batch with no records
    EmptyBatch,
    /// A batch above the configured row bound
    BatchTooLarge,
    /// Table, view or column name is not a plain identifier
    InvalidIdentifier,
    /// Table creation failed
    ProvisionError,
    /// A read query failed
    QueryError,
    /// Failure outside the taxonomy (task panics, join errors)
    InternalError,
}

impl ErrorKind {
    /// Snake-case code used in logs and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "connection_error",
            Self::UnknownTable => "unknown_table",
            Self::EmptyResult => "empty_result",
            Self::EmptyArtifact => "empty_artifact",
            Self::CorruptArtifact => "corrupt_artifact",
            Self::InvalidArtifactName => "invalid_artifact_name",
            Self::ArtifactNotFound => "artifact_not_found",
            Self::EncodingError => "encoding_error",
            Self::WriteError => "write_error",
            Self::BatchInsertError => "batch_insert_error",
            Self::InvalidRecord => "invalid_record",
            Self::EmptyBatch => "empty_batch",
            Self::BatchTooLarge => "batch_too_large",
            Self::InvalidIdentifier => "invalid_identifier",
            Self::ProvisionError => "provision_error",
            Self::QueryError => "query_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised by schema inference, the codec, the catalog and batch validation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unknown table '{table}': expected one of hired_employees, departments, jobs")]
    UnknownTable { table: String },

    #[error("no data found in {source_name}")]
    EmptyResult { source_name: String },

    #[error("no data to restore in artifact {artifact}")]
    EmptyArtifact { artifact: String },

    #[error("corrupt artifact {artifact}: {reason}")]
    CorruptArtifact { artifact: String, reason: String },

    #[error("invalid artifact name '{name}': expected format {{table_name}}_backup.avro")]
    InvalidArtifactName { name: String },

    #[error("artifact not found: {path}")]
    ArtifactNotFound { path: String },

    #[error("cannot encode field '{field}': {reason}")]
    Encoding { field: String, reason: String },

    #[error("cannot write artifact {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {table} record at index {index}: {reason}")]
    InvalidRecord {
        table: String,
        index: usize,
        reason: String,
    },

    #[error("batch for {table} contains no records")]
    EmptyBatch { table: String },

    #[error("batch for {table} has {rows} records, limit is {max}")]
    BatchTooLarge {
        table: String,
        rows: usize,
        max: usize,
    },

    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: IdentifierError,
    },
}

impl CoreError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTable { .. } => ErrorKind::UnknownTable,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::EmptyArtifact { .. } => ErrorKind::EmptyArtifact,
            Self::CorruptArtifact { .. } => ErrorKind::CorruptArtifact,
            Self::InvalidArtifactName { .. } => ErrorKind::InvalidArtifactName,
            Self::ArtifactNotFound { .. } => ErrorKind::ArtifactNotFound,
            Self::Encoding { .. } => ErrorKind::EncodingError,
            Self::Write { .. } => ErrorKind::WriteError,
            Self::InvalidRecord { .. } => ErrorKind::InvalidRecord,
            Self::EmptyBatch { .. } => ErrorKind::EmptyBatch,
            Self::BatchTooLarge { .. } => ErrorKind::BatchTooLarge,
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
        }
    }

    pub(crate) fn corrupt(artifact: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::CorruptArtifact {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encoding(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
