use serde::{Deserialize, Serialize};
use tabvault_core::{Record, TableId};
use tabvault_store::{BackupReport, LoadReport, RestoreReport};

/// Response of a successful insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertResponse {
    pub status: String,
    pub rows_inserted: usize,
}

impl From<LoadReport> for InsertResponse {
    fn from(report: LoadReport) -> Self {
        Self {
            status: format!("Inserted {} data successfully", report.table.record_label()),
            rows_inserted: report.rows_inserted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupResponse {
    pub status: String,
    pub file_path: String,
    pub records: usize,
}

impl From<BackupReport> for BackupResponse {
    fn from(report: BackupReport) -> Self {
        Self {
            status: "Backup completed".to_string(),
            file_path: report.file_path.display().to_string(),
            records: report.records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub status: String,
    pub table: TableId,
    pub rows_loaded: usize,
    pub table_created: bool,
}

impl From<RestoreReport> for RestoreResponse {
    fn from(report: RestoreReport) -> Self {
        Self {
            status: "Restore successful".to_string(),
            table: report.table,
            rows_loaded: report.rows_loaded,
            table_created: report.table_created,
        }
    }
}

/// Rows of a view, one object per row keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    pub data: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
}
