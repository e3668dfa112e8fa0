use axum::{
    extract::{Extension, State},
    response::Json,
};

use crate::runtime::{
    HttpVaultRuntime,
    error::{ApiError, Operation, RequestIdExtension},
    handlers::run_blocking,
    types::{ViewQuery, ViewResponse},
};

/// POST /report/query_view - read every row of a view
pub async fn query_view(
    State(runtime): State<HttpVaultRuntime>,
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    Json(query): Json<ViewQuery>,
) -> Result<Json<ViewResponse>, ApiError> {
    tracing::info!(request_id = %request_id, view = %query.view_name, "View report requested");

    let vault = runtime.vault.clone();
    let data = run_blocking(Operation::QueryView, &request_id, move || {
        vault.query_view(&query.db_credentials, &query.view_name)
    })
    .await?;

    Ok(Json(ViewResponse { data }))
}
