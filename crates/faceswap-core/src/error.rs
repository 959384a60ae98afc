//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant
//! self-describes its HTTP presentation through `ErrorMetadata`, so the API
//! layer can render a consistent body without matching on variants.
//!
//! Storage upload failures and workspace cleanup failures are deliberately
//! absent: both are recovered locally and only ever logged.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_INPUT")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No face detected in source image")]
    NoFaceDetected,

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Workspace allocation failed: {0}")]
    Allocation(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NoFaceDetected => (400, "NO_FACE_DETECTED", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::Allocation(_) => (500, "WORKSPACE_ALLOCATION_FAILED", true, LogLevel::Error),
        AppError::Processing(_) => (500, "PROCESSING_ERROR", false, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NoFaceDetected => "NoFaceDetected",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Allocation(_) => "Allocation",
            AppError::Processing(_) => "Processing",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Whether the caller caused this error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NoFaceDetected => "No face detected in source image".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Allocation(_) => "Failed to allocate request workspace".to_string(),
            AppError::Processing(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            // The adapter's own message is kept so callers can diagnose failed swaps.
            AppError::InternalWithSource { ref message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_input() {
        let err = AppError::InvalidInput("Source file must be an image".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.client_message(), "Source file must be an image");
        assert!(!err.is_sensitive());
        assert!(err.is_client_error());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_no_face_detected_is_client_error() {
        let err = AppError::NoFaceDetected;
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().contains("No face detected"));
    }

    #[test]
    fn test_processing_error_keeps_message() {
        let err = AppError::Processing("Failed to generate output file".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert!(!err.is_client_error());
        assert_eq!(err.client_message(), "Failed to generate output file");
    }

    #[test]
    fn test_internal_with_source_preserves_chain() {
        let source = anyhow::anyhow!("exit status 1").context("face swapper failed");
        let err = AppError::from(source);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "face swapper failed");
        assert!(err.is_sensitive());
        assert!(err.detailed_message().contains("Caused by"));
    }

    #[test]
    fn test_io_error_hides_details_from_client() {
        let err = AppError::from(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.detailed_message().contains("disk gone"));
    }
}
