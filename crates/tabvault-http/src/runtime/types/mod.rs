//! Request and response bodies for the HTTP routes.

pub mod requests;
pub mod responses;

pub use requests::{BackupRequest, InsertRequest, RestoreRequest, ViewQuery};
pub use responses::{BackupResponse, HealthResponse, InsertResponse, RestoreResponse, ViewResponse};
