//! HTTP routes.
//!
//! Handlers take raw bodies and parse them here so that malformed input is
//! reported with the same `{"error": ...}` shape as store failures.

pub mod applications;
pub mod docs;
pub mod values;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use jobtrack::{StoreError, UploadError};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/values",
            get(values::list)
                .post(values::create)
                .put(values::update)
                .delete(values::delete),
        )
        .route(
            "/api/application",
            get(applications::list).post(applications::create),
        )
        .route("/api/application/docs", get(docs::list_by_applications))
        .route(
            "/api/application/:id",
            get(applications::get)
                .put(applications::update)
                .delete(applications::delete),
        )
        .route("/api/application/:id/docs", post(docs::upload))
        .route("/api/docs/:doc_id", get(docs::download))
        .with_state(state)
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Upload(UploadError),
    /// A transport-level rejection (multipart framing, body limits).
    Status(StatusCode, String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upload(UploadError::MissingFile) => StatusCode::BAD_REQUEST,
            ApiError::Upload(UploadError::UnsupportedType) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upload(UploadError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Status(status, _) => *status,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Store(err) => err.to_string(),
            // The path is server-internal.
            ApiError::Upload(UploadError::Io { .. }) => "Failed to store upload".to_string(),
            ApiError::Upload(err) => err.to_string(),
            ApiError::Status(_, message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Upload(err) => error!(error = %err, "upload failed"),
                other => error!(error = ?other, "request failed"),
            }
        } else {
            debug!(status = status.as_u16(), error = %self.message(), "request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Parses a JSON request body, reporting failures as `InvalidArgument`.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| StoreError::invalid(format!("invalid payload: {}", e)).into())
}

/// Parses an integer id taken from a path segment or query parameter.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::invalid(format!("invalid id '{}'", raw)).into())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status_codes() {
        let cases = [
            (StoreError::invalid("x"), StatusCode::BAD_REQUEST),
            (StoreError::conflict("x"), StatusCode::CONFLICT),
            (StoreError::not_found("x"), StatusCode::NOT_FOUND),
            (
                StoreError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_upload_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(UploadError::MissingFile).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(UploadError::UnsupportedType).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::from(UploadError::TooLarge { size: 10, max: 5 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_io_error_message_hides_path() {
        let err = ApiError::from(UploadError::Io {
            path: "/srv/secret/uploads".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert!(!err.message().contains("/srv/secret"));
    }

    #[test]
    fn test_parse_json_reports_invalid_argument() {
        let err = parse_json::<jobtrack::NewFieldValue>(br#"{"type":"priority","label":"x"}"#)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 42 ").unwrap(), 42);
        assert!(parse_id("abc").is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
