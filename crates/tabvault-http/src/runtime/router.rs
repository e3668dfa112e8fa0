//! Route table and middleware stack

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::runtime::{
    HttpRuntimeConfig, HttpVaultRuntime,
    error::request_id_middleware,
    handlers::{backup_table, health_check, insert_entries, query_view, restore_artifact},
};

impl HttpVaultRuntime {
    /// Router with default configuration.
    pub fn router(self) -> Router {
        self.router_with_config(&HttpRuntimeConfig::default())
    }

    /// Router with body limit and CORS taken from `config`.
    pub fn router_with_config(self, config: &HttpRuntimeConfig) -> Router {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/insert/{table}", post(insert_entries))
            .route("/backup/{table}", get(backup_table))
            .route("/restore", post(restore_artifact))
            .route("/report/query_view", post(query_view))
            .with_state(self)
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http());

        if config.enable_cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }
}
