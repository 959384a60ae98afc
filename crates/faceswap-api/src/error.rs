//! HTTP error response conversion
//!
//! **Preferred handler pattern:** return `Result<Response, HttpAppError>` and use
//! `AppError` (or anything `Into<AppError>`) for failures, attaching the
//! request id with [`HttpAppError::with_request_id`] so every error body
//! carries it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faceswap_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from faceswap-core)
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub request_id: Option<Uuid>,
    pub production: bool,
}

impl HttpAppError {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
            production: false,
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Hide error chains from clients
    pub fn in_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> ErrorResponse {
        let app_error = &self.error;
        let show_details = !self.production && !app_error.is_sensitive();

        ErrorResponse {
            error: app_error.client_message(),
            request_id: self.request_id.map(|id| id.to_string()),
            code: app_error.error_code().to_string(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
        }
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError::new(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError::new(AppError::from(err))
    }
}

fn log_error(error: &AppError, request_id: Option<Uuid>) {
    let error_type = error.error_type();
    let request_id = request_id.map(|id| id.to_string()).unwrap_or_default();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, request_id = %request_id, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, request_id = %request_id, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                request_id = %request_id,
                chain = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.error, self.request_id);
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_carries_request_id_and_code() {
        let id = Uuid::new_v4();
        let err = HttpAppError::new(AppError::NoFaceDetected).with_request_id(id);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body.error, "No face detected in source image");
        assert_eq!(body.request_id, Some(id.to_string()));
        assert_eq!(body.code, "NO_FACE_DETECTED");
    }

    #[test]
    fn test_details_hidden_in_production() {
        let err = HttpAppError::new(AppError::Processing("Failed to generate output file".into()));
        assert!(err.body().details.is_some());

        let err = err.in_production(true);
        let body = err.body();
        assert!(body.details.is_none());
        assert_eq!(body.error, "Failed to generate output file");
    }

    #[test]
    fn test_sensitive_errors_never_expose_chain() {
        let err = HttpAppError::new(AppError::Internal("db password wrong".into()));
        let body = err.body();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
