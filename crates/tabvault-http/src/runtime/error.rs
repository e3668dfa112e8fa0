//! Error handling for the HTTP runtime
//!
//! Store failures keep their [`ErrorKind`]; this module decides the status
//! code per operation, renders the JSON error body and tags every response
//! with a request id.

use axum::{
    extract::Request,
    http::{
        StatusCode,
        header::{HeaderName, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabvault_core::ErrorKind;
use tabvault_store::StoreError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum length for client-provided request IDs
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Correlation id for one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Parse a client-provided id.
    ///
    /// Only ASCII alphanumerics, `-` and `_` are accepted so ids can be
    /// written to logs verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_REQUEST_ID_LENGTH
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension for storing [`RequestId`] in Axum request extensions
#[derive(Debug, Clone)]
pub struct RequestIdExtension(pub RequestId);

/// Middleware that extracts or generates the request id
///
/// A valid `X-Request-ID` header is reused; anything else is replaced with a
/// fresh UUID. The id is stored in request extensions for handlers and
/// echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_else(RequestId::generate);

    request
        .extensions_mut()
        .insert(RequestIdExtension(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    response
}

/// The route an error came from. Some routes override the default status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Insert,
    Backup,
    Restore,
    QueryView,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::QueryView => "query_view",
        }
    }
}

/// Standardized error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code, e.g. `batch_insert_error`
    pub error: ErrorKind,
    /// Human-readable cause
    pub message: String,
    pub request_id: RequestId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A failed operation, ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub request_id: RequestId,
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(
        operation: Operation,
        request_id: RequestId,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            operation,
            kind,
            message: message.into(),
        }
    }

    pub fn from_store(operation: Operation, request_id: RequestId, error: StoreError) -> Self {
        Self::new(operation, request_id, error.kind(), error.to_string())
    }

    /// Status code for this error on its route.
    pub fn status_code(&self) -> StatusCode {
        match (self.operation, self.kind) {
            (_, ErrorKind::InternalError) => StatusCode::INTERNAL_SERVER_ERROR,
            (Operation::Restore, _) => StatusCode::INTERNAL_SERVER_ERROR,
            (Operation::QueryView, ErrorKind::ConnectionError) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (Operation::QueryView, _) => StatusCode::BAD_REQUEST,
            (_, kind) => default_status(kind),
        }
    }

    fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind,
            message: self.message.clone(),
            request_id: self.request_id.clone(),
            timestamp: chrono::Utc::now(),
        }
    }
}

fn default_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRecord
        | ErrorKind::EmptyBatch
        | ErrorKind::BatchTooLarge
        | ErrorKind::BatchInsertError
        | ErrorKind::InvalidIdentifier
        | ErrorKind::InvalidArtifactName => StatusCode::BAD_REQUEST,
        ErrorKind::UnknownTable | ErrorKind::EmptyResult | ErrorKind::ArtifactNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorKind::ConnectionError
        | ErrorKind::EmptyArtifact
        | ErrorKind::CorruptArtifact
        | ErrorKind::EncodingError
        | ErrorKind::WriteError
        | ErrorKind::ProvisionError
        | ErrorKind::QueryError
        | ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation.as_str(), self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::error!(
            request_id = %self.request_id,
            operation = self.operation.as_str(),
            kind = %self.kind,
            status = status.as_u16(),
            message = %self.message,
            "Request failed"
        );

        (status, Json(self.to_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabvault_core::CoreError;

    fn error(operation: Operation, kind: ErrorKind) -> ApiError {
        ApiError::new(operation, RequestId::generate(), kind, "boom")
    }

    #[test]
    fn test_request_id_validation() {
        assert!(RequestId::parse("abc-123_DEF").is_some());
        assert!(RequestId::parse("").is_none());
        assert!(RequestId::parse("has space").is_none());
        assert!(RequestId::parse("key:value").is_none());
        assert!(RequestId::parse(&"a".repeat(129)).is_none());
        assert_eq!(RequestId::generate().as_str().len(), 36);
    }

    #[test]
    fn test_insert_statuses() {
        assert_eq!(
            error(Operation::Insert, ErrorKind::UnknownTable).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error(Operation::Insert, ErrorKind::BatchInsertError).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error(Operation::Insert, ErrorKind::InvalidRecord).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error(Operation::Insert, ErrorKind::ConnectionError).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backup_statuses() {
        assert_eq!(
            error(Operation::Backup, ErrorKind::EmptyResult).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error(Operation::Backup, ErrorKind::InvalidIdentifier).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error(Operation::Backup, ErrorKind::QueryError).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_route_overrides() {
        for kind in [
            ErrorKind::ArtifactNotFound,
            ErrorKind::InvalidArtifactName,
            ErrorKind::UnknownTable,
        ] {
            assert_eq!(
                error(Operation::Restore, kind).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
        assert_eq!(
            error(Operation::QueryView, ErrorKind::QueryError).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error(Operation::QueryView, ErrorKind::ConnectionError).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_store_keeps_kind_and_cause() {
        let store_error = StoreError::from(CoreError::UnknownTable {
            table: "employees".into(),
        });
        let api = ApiError::from_store(Operation::Insert, RequestId::generate(), store_error);

        assert_eq!(api.kind, ErrorKind::UnknownTable);
        assert!(api.message.contains("employees"));

        let body = serde_json::to_value(api.to_response()).unwrap();
        assert_eq!(body["error"], "unknown_table");
        assert_eq!(body["request_id"], api.request_id.as_str());
    }
}
