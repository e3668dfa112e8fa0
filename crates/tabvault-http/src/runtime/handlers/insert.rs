use axum::{
    extract::{Extension, Path, State},
    response::Json,
};

use crate::runtime::{
    HttpVaultRuntime,
    error::{ApiError, Operation, RequestIdExtension},
    handlers::run_blocking,
    types::{InsertRequest, InsertResponse},
};

/// POST /insert/{table} - validate and insert a batch in one transaction
pub async fn insert_entries(
    State(runtime): State<HttpVaultRuntime>,
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    Path(table): Path<String>,
    Json(request): Json<InsertRequest>,
) -> Result<Json<InsertResponse>, ApiError> {
    tracing::info!(
        request_id = %request_id,
        table = %table,
        entries = request.entries.len(),
        "Insert requested"
    );

    let vault = runtime.vault.clone();
    let report = run_blocking(Operation::Insert, &request_id, move || {
        vault.insert_json(&request.db_credentials, &table, request.entries)
    })
    .await?;

    Ok(Json(report.into()))
}
