//! # Runtime Module
//!
//! The HTTP surface of Tabvault.
//!
//! - [`HttpVaultRuntime`] holds the shared [`TableVault`](tabvault_store::TableVault)
//!   and the artifact locator used for backups and restores
//! - [`router`] wires the routes with request-id, trace, body-limit and
//!   optional CORS layers
//! - [`error`] maps store failures to status codes and JSON error bodies
//! - [`config`] builds [`HttpRuntimeConfig`] from `TABVAULT_*` environment variables

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod shutdown;
pub mod types;

pub use config::{ConfigError, HttpRuntimeConfigBuilder};
pub use error::{
    ApiError, ErrorResponse, Operation, RequestId, RequestIdExtension, request_id_middleware,
};
pub use http::{HttpRuntimeConfig, HttpVaultRuntime};
pub use shutdown::shutdown_signal;
pub use types::*;
