//! Canonical log line for swap requests
//!
//! One structured event per `/swap` call describing what happened to the
//! request, emitted on every exit path.

use chrono::{DateTime, Utc};
use faceswap_core::{MediaKind, OutputFormat};
use serde::Serialize;
use uuid::Uuid;

/// Outcome of the request
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Error,
    ClientError,
    /// The client went away before a response was produced
    Cancelled,
}

impl Outcome {
    pub fn from_status_code(status: u16) -> Self {
        if status >= 500 {
            Outcome::Error
        } else if status >= 400 {
            Outcome::ClientError
        } else {
            Outcome::Success
        }
    }
}

/// How the artifact reached the client
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Inline,
    Url,
    /// Upload failed, bytes were returned instead
    FallbackInline,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapEvent {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
    pub environment: String,
    pub status_code: u16,
    pub outcome: Outcome,
    pub duration_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Stage timings and other per-request numbers
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

impl SwapEvent {
    pub fn new(request_id: Uuid, timestamp: DateTime<Utc>, environment: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            timestamp,
            service: crate::constants::SERVICE_NAME,
            environment: environment.to_string(),
            status_code: 0,
            outcome: Outcome::Success,
            duration_ms: 0,
            source_size_bytes: None,
            target_size_bytes: None,
            output_size_bytes: None,
            target_kind: None,
            output_format: None,
            delivery: None,
            error_code: None,
            error_message: None,
            metrics: serde_json::Map::new(),
        }
    }

    /// Record a named measurement
    pub fn metric(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.metrics.insert(name.to_string(), value.into());
    }

    pub fn finalize(&mut self, status_code: u16, duration_ms: u64) {
        self.status_code = status_code;
        self.duration_ms = duration_ms;
        self.outcome = Outcome::from_status_code(status_code);
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn emit(&self) {
        let json = match self.to_json_string() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize swap event to JSON");
                return;
            }
        };

        let request_id = &self.request_id;
        let status_code = self.status_code;
        match self.outcome {
            Outcome::Success => {
                tracing::info!(%request_id, %status_code, duration_ms = self.duration_ms, "{}", json);
            }
            Outcome::ClientError | Outcome::Cancelled => {
                tracing::warn!(%request_id, %status_code, duration_ms = self.duration_ms, "{}", json);
            }
            Outcome::Error => {
                tracing::error!(%request_id, %status_code, duration_ms = self.duration_ms, "{}", json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_status_code() {
        assert_eq!(Outcome::from_status_code(200), Outcome::Success);
        assert_eq!(Outcome::from_status_code(400), Outcome::ClientError);
        assert_eq!(Outcome::from_status_code(413), Outcome::ClientError);
        assert_eq!(Outcome::from_status_code(500), Outcome::Error);
        assert_eq!(
            serde_json::to_value(Outcome::Cancelled).unwrap(),
            serde_json::json!("cancelled")
        );
    }

    #[test]
    fn test_event_serializes_only_known_fields() {
        let mut event = SwapEvent::new(Uuid::nil(), Utc::now(), "test");
        event.metric("swap_ms", 12);
        event.delivery = Some(Delivery::FallbackInline);
        event.finalize(200, 42);

        let value: serde_json::Value =
            serde_json::from_str(&event.to_json_string().unwrap()).unwrap();
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["delivery"], "fallback_inline");
        assert_eq!(value["duration_ms"], 42);
        assert_eq!(value["metrics"]["swap_ms"], 12);
        assert!(value.get("error_code").is_none());
        assert!(value.get("target_kind").is_none());
    }
}
