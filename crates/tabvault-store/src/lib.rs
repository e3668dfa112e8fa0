//! # Tabvault Store
//!
//! SQLite-backed operations for Tabvault: table provisioning for the fixed
//! catalog, transactional bulk loading, and the backup and restore pipelines.
//!
//! Every operation takes [`DbCredentials`] explicitly and opens its own
//! connection; nothing is pooled or cached between calls.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tabvault_store::{BackupDirectory, DbCredentials, StoreConfig, TableVault};
//!
//! # fn main() -> Result<(), tabvault_store::StoreError> {
//! let vault = TableVault::new(StoreConfig::default().with_data_dir("data"));
//! let creds = DbCredentials::local("hr.db");
//!
//! vault.insert_json(&creds, "jobs", vec![json!({"id": 1, "job": "Engineer"})])?;
//! let report = vault.backup(&creds, "jobs", &BackupDirectory::new("backups"))?;
//! println!("wrote {}", report.file_path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod loader;
pub mod location;
pub mod provisioner;
pub mod query;
pub mod stage;
pub mod vault;

pub use config::{RequiredLogin, StoreConfig};
pub use connection::{SqliteConnector, StoreConnection};
pub use credentials::DbCredentials;
pub use error::{StoreError, StoreResult};
pub use loader::{BulkLoader, LoadReport};
pub use location::{ArtifactLocator, BackupDirectory};
pub use provisioner::Provisioned;
pub use stage::{BackupStage, RestoreStage, Stage, StageTracker};
pub use vault::{BackupReport, RestoreReport, TableVault};
