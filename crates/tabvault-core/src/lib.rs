//! # Tabvault Core
//!
//! Store-independent building blocks for moving tables in and out of a relational
//! store:
//!
//! - **[PortableKind]**: the closed scalar type system and the native type mapper
//! - **[RecordSchema]**: schema inference over a fetched [ResultSet]
//! - **[codec]**: Avro object container encoding of one schema plus its records
//! - **[TableId]**: the fixed table catalog with its column layouts
//! - **[Batch]**: a validated, non-empty set of records bound for one table
//!
//! Nothing in this crate touches a database connection. The store crate drives
//! these types against SQLite.
//!
//! ## Example
//!
//! ```rust
//! use tabvault_core::{ResultColumn, ResultSet, Scalar, codec, infer_schema};
//!
//! let result_set = ResultSet::new(
//!     "jobs",
//!     vec![
//!         ResultColumn::new("id", Some("INTEGER")),
//!         ResultColumn::new("job", Some("VARCHAR(50)")),
//!     ],
//!     vec![vec![Scalar::Integer(1), Scalar::Text("Engineer".into())]],
//! );
//!
//! let schema = infer_schema(&result_set).unwrap();
//! let records = result_set.into_records(&schema);
//! let bytes = codec::encode(&schema, &records).unwrap();
//! let artifact = codec::decode(&bytes, "in-memory").unwrap();
//! assert_eq!(artifact.schema, schema);
//! assert_eq!(artifact.records, records);
//! ```

pub mod artifact;
pub mod batch;
pub mod catalog;
pub mod codec;
pub mod collections;
pub mod error;
pub mod identifiers;
pub mod kind;
pub mod record;
pub mod schema;

pub use artifact::{ARTIFACT_SUFFIX, artifact_file_name, table_identity_from_path};
pub use batch::Batch;
pub use catalog::{ColumnSpec, TableId, TableLayout};
pub use codec::Artifact;
pub use collections::NonEmptyVec;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use identifiers::{IdentifierError, SqlIdentifier};
pub use kind::PortableKind;
pub use record::{Record, Scalar};
pub use schema::{Field, RecordSchema, ResultColumn, ResultSet, infer_schema};
