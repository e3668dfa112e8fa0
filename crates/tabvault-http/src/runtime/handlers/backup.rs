use axum::{
    extract::{Extension, Path, State},
    response::Json,
};

use crate::runtime::{
    HttpVaultRuntime,
    error::{ApiError, Operation, RequestIdExtension},
    handlers::run_blocking,
    types::{BackupRequest, BackupResponse},
};

/// GET /backup/{table} - write the table to an artifact in the backup directory
pub async fn backup_table(
    State(runtime): State<HttpVaultRuntime>,
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    Path(table): Path<String>,
    Json(request): Json<BackupRequest>,
) -> Result<Json<BackupResponse>, ApiError> {
    tracing::info!(request_id = %request_id, table = %table, "Backup requested");

    let vault = runtime.vault.clone();
    let locator = runtime.locator.clone();
    let report = run_blocking(Operation::Backup, &request_id, move || {
        vault.backup(&request.db_credentials, &table, locator.as_ref())
    })
    .await?;

    Ok(Json(report.into()))
}
