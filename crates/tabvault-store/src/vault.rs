//! Backup, restore and insert operations over per-request connections.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use tabvault_core::{
    Batch, CoreError, Record, SqlIdentifier, TableId, codec, infer_schema,
    table_identity_from_path,
};

use crate::config::StoreConfig;
use crate::connection::SqliteConnector;
use crate::credentials::DbCredentials;
use crate::error::StoreResult;
use crate::loader::{BulkLoader, LoadReport};
use crate::location::ArtifactLocator;
use crate::provisioner::{self, Provisioned};
use crate::query;
use crate::stage::{BackupStage, RestoreStage, StageTracker};

/// Result of a completed backup.
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub table: String,
    pub file_path: PathBuf,
    pub records: usize,
    pub bytes: u64,
    pub stages: Vec<BackupStage>,
}

/// Result of a completed restore.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub table: TableId,
    pub file_path: PathBuf,
    pub rows_loaded: usize,
    pub table_created: bool,
    pub stages: Vec<RestoreStage>,
}

/// Entry point for every store-facing operation.
///
/// Each call opens its own connection from the supplied credentials and
/// releases it before returning.
#[derive(Debug, Clone)]
pub struct TableVault {
    connector: SqliteConnector,
    loader: BulkLoader,
}

impl TableVault {
    pub fn new(config: StoreConfig) -> Self {
        let loader = BulkLoader::new(config.max_statement_params);
        Self {
            connector: SqliteConnector::new(config),
            loader,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.connector.config()
    }

    /// Insert a validated batch in one transaction.
    pub fn insert(&self, credentials: &DbCredentials, batch: &Batch) -> StoreResult<LoadReport> {
        let _span = tracing::info_span!("insert", table = %batch.table()).entered();

        batch.ensure_max_rows(self.config().max_batch_rows)?;
        let conn = self.connector.connect(credentials)?;
        self.loader.load(conn, batch)
    }

    /// Validate raw JSON entries for a catalog table, then insert them.
    pub fn insert_json(
        &self,
        credentials: &DbCredentials,
        table: &str,
        entries: Vec<JsonValue>,
    ) -> StoreResult<LoadReport> {
        let table = TableId::parse(table)?;
        let batch = Batch::from_json(table, entries)?;
        self.insert(credentials, &batch)
    }

    /// Back up a table to the location chosen by `locator`.
    pub fn backup(
        &self,
        credentials: &DbCredentials,
        table: &str,
        locator: &dyn ArtifactLocator,
    ) -> StoreResult<BackupReport> {
        self.run_backup(credentials, table, |source| {
            locator.backup_destination(source.as_str())
        })
    }

    /// Back up a table to an explicit artifact path.
    pub fn backup_to(
        &self,
        credentials: &DbCredentials,
        table: &str,
        path: &Path,
    ) -> StoreResult<BackupReport> {
        self.run_backup(credentials, table, |_| Ok(path.to_path_buf()))
    }

    fn run_backup(
        &self,
        credentials: &DbCredentials,
        table: &str,
        destination: impl FnOnce(&SqlIdentifier) -> StoreResult<PathBuf>,
    ) -> StoreResult<BackupReport> {
        let _span = tracing::info_span!("backup", table = %table).entered();
        let mut stages = StageTracker::<BackupStage>::new("backup");

        let outcome = self.backup_stages(&mut stages, credentials, table, destination);
        match outcome {
            Ok((file_path, records, bytes)) => {
                stages.advance();
                tracing::info!(path = %file_path.display(), records, "Backup completed");
                Ok(BackupReport {
                    table: table.to_string(),
                    file_path,
                    records,
                    bytes,
                    stages: stages.into_visited(),
                })
            }
            Err(error) => {
                stages.fail(&error);
                Err(error)
            }
        }
    }

    fn backup_stages(
        &self,
        stages: &mut StageTracker<BackupStage>,
        credentials: &DbCredentials,
        table: &str,
        destination: impl FnOnce(&SqlIdentifier) -> StoreResult<PathBuf>,
    ) -> StoreResult<(PathBuf, usize, u64)> {
        let source = SqlIdentifier::parse(table)?;

        let conn = self.connector.connect(credentials)?;
        stages.advance();

        let result_set = query::fetch_all(&conn, &source)?;
        conn.close()?;
        stages.advance();

        let schema = infer_schema(&result_set)?;
        stages.advance();

        let records = result_set.into_records(&schema);
        let path = destination(&source)?;
        let bytes = codec::write_artifact(&path, &schema, &records)?;
        stages.advance();

        Ok((path, records.len(), bytes))
    }

    /// Restore the artifact chosen by `locator`.
    pub fn restore(
        &self,
        credentials: &DbCredentials,
        locator: &dyn ArtifactLocator,
        file_name: Option<&str>,
    ) -> StoreResult<RestoreReport> {
        self.run_restore(credentials, || locator.restore_source(file_name))
    }

    /// Restore an artifact from an explicit path.
    ///
    /// A path that is not a file fails before the store is touched.
    pub fn restore_from(
        &self,
        credentials: &DbCredentials,
        path: &Path,
    ) -> StoreResult<RestoreReport> {
        self.run_restore(credentials, || {
            if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(CoreError::ArtifactNotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
        })
    }

    fn run_restore(
        &self,
        credentials: &DbCredentials,
        select: impl FnOnce() -> StoreResult<PathBuf>,
    ) -> StoreResult<RestoreReport> {
        let _span = tracing::info_span!("restore").entered();
        let mut stages = StageTracker::<RestoreStage>::new("restore");

        match self.restore_stages(&mut stages, credentials, select) {
            Ok((file_path, table, provisioned, load)) => {
                stages.advance();
                tracing::info!(
                    table = %table,
                    path = %file_path.display(),
                    rows = load.rows_inserted,
                    table_created = provisioned.was_created(),
                    "Restore successful"
                );
                Ok(RestoreReport {
                    table,
                    file_path,
                    rows_loaded: load.rows_inserted,
                    table_created: provisioned.was_created(),
                    stages: stages.into_visited(),
                })
            }
            Err(error) => {
                stages.fail(&error);
                Err(error)
            }
        }
    }

    fn restore_stages(
        &self,
        stages: &mut StageTracker<RestoreStage>,
        credentials: &DbCredentials,
        select: impl FnOnce() -> StoreResult<PathBuf>,
    ) -> StoreResult<(PathBuf, TableId, Provisioned, LoadReport)> {
        let path = select()?;
        stages.advance();

        let identity = table_identity_from_path(&path)?;
        let table = TableId::parse(&identity)?;
        stages.advance();

        let conn = self.connector.connect(credentials)?;
        let provisioned = provisioner::ensure_table(&conn, table)?;
        stages.advance();

        let artifact = codec::read_artifact(&path)?;
        let batch = Batch::from_records(table, artifact.records)?;
        stages.advance();

        let load = self.loader.load(conn, &batch)?;
        stages.advance();

        Ok((path, table, provisioned, load))
    }

    /// Read every row of a view, keyed by column name.
    pub fn query_view(&self, credentials: &DbCredentials, view: &str) -> StoreResult<Vec<Record>> {
        let _span = tracing::info_span!("query_view", view = %view).entered();

        let view = SqlIdentifier::parse(view)?;
        let conn = self.connector.connect(credentials)?;
        let result_set = query::fetch_view(&conn, &view)?;
        conn.close()?;

        tracing::info!(rows = result_set.rows.len(), "Queried view");
        Ok(result_set.row_records())
    }
}
