//! # Tabvault
//!
//! Table backups to Avro object container files, restores into a fixed table
//! catalog, and transactional bulk inserts against SQLite stores.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`tabvault_core`]: portable types, schema inference, the artifact codec
//!   and the table catalog
//! - [`tabvault_store`]: connections, provisioning, bulk loading and the
//!   backup and restore pipelines
//! - [`tabvault_http`]: the axum runtime serving those operations

pub use tabvault_core::{
    ARTIFACT_SUFFIX, Artifact, Batch, CoreError, ErrorKind, Field, PortableKind, Record,
    RecordSchema, Scalar, TableId, artifact_file_name, codec, infer_schema,
    table_identity_from_path,
};
pub use tabvault_http::{HttpRuntimeConfig, HttpRuntimeConfigBuilder, HttpVaultRuntime};
pub use tabvault_store::{
    ArtifactLocator, BackupDirectory, BackupReport, DbCredentials, LoadReport, RestoreReport,
    StoreConfig, StoreError, TableVault,
};
