use axum::{
    extract::{Extension, State},
    response::Json,
};

use crate::runtime::{
    HttpVaultRuntime,
    error::{ApiError, Operation, RequestIdExtension},
    handlers::run_blocking,
    types::{RestoreRequest, RestoreResponse},
};

/// POST /restore - provision the artifact's table and load its records
pub async fn restore_artifact(
    State(runtime): State<HttpVaultRuntime>,
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>, ApiError> {
    tracing::info!(
        request_id = %request_id,
        file_name = request.file_name.as_deref().unwrap_or("<newest>"),
        "Restore requested"
    );

    let vault = runtime.vault.clone();
    let locator = runtime.locator.clone();
    let report = run_blocking(Operation::Restore, &request_id, move || {
        vault.restore(
            &request.db_credentials,
            locator.as_ref(),
            request.file_name.as_deref(),
        )
    })
    .await?;

    Ok(Json(report.into()))
}
