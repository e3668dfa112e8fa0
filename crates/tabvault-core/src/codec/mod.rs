//! Backup artifact codec.
//!
//! An artifact is one Avro object container file: a header carrying the
//! writer schema, then the records. Writes go to a sibling temporary file that
//! is renamed into place, so readers never observe a partially written
//! artifact.

mod avro;

use apache_avro::{Reader, Writer};
use std::fs;
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::schema::RecordSchema;

/// A decoded artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub schema: RecordSchema,
    pub records: Vec<Record>,
}

/// Encode a schema and its records into container bytes.
pub fn encode(schema: &RecordSchema, records: &[Record]) -> CoreResult<Vec<u8>> {
    let avro_schema = avro::to_avro_schema(schema)?;
    let mut writer = Writer::new(&avro_schema, Vec::new());

    for record in records {
        let value = avro::to_avro_value(schema, record)?;
        writer
            .append(value)
            .map_err(|e| CoreError::encoding(schema.name(), e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::encoding(schema.name(), e.to_string()))
}

/// Decode container bytes. `label` names the artifact in errors.
///
/// Fails with [`CoreError::EmptyArtifact`] when the container holds no records.
pub fn decode(bytes: &[u8], label: &str) -> CoreResult<Artifact> {
    let reader = Reader::new(bytes).map_err(|e| CoreError::corrupt(label, e))?;
    let schema = avro::from_avro_schema(reader.writer_schema(), label)?;

    let mut records = Vec::new();
    for value in reader {
        let value = value.map_err(|e| CoreError::corrupt(label, e))?;
        records.push(avro::from_avro_value(&schema, value, label)?);
    }

    if records.is_empty() {
        return Err(CoreError::EmptyArtifact {
            artifact: label.to_string(),
        });
    }

    Ok(Artifact { schema, records })
}

/// Encode and atomically write an artifact, returning the number of bytes written.
///
/// An existing file at `path` is replaced as a whole.
pub fn write_artifact(path: &Path, schema: &RecordSchema, records: &[Record]) -> CoreResult<u64> {
    let bytes = encode(schema, records)?;
    let write_error = |source: std::io::Error| CoreError::Write {
        path: path.display().to_string(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staging = NamedTempFile::new_in(parent).map_err(write_error)?;
    staging.write_all(&bytes).map_err(write_error)?;
    staging.as_file().sync_all().map_err(write_error)?;
    staging.persist(path).map_err(|e| write_error(e.error))?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        records = records.len(),
        "Wrote artifact"
    );
    Ok(bytes.len() as u64)
}

/// Read and decode an artifact file.
pub fn read_artifact(path: &Path) -> CoreResult<Artifact> {
    let label = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::ArtifactNotFound {
            path: label.clone(),
        },
        _ => CoreError::corrupt(label.clone(), e),
    })?;
    decode(&bytes, &label)
}
