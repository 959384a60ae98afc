use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use faceswap_core::OutputFormat;
use faceswap_processing::Workspace;
use uuid::Uuid;

use crate::telemetry::{Outcome, SwapEvent};

/// Status recorded when the handler is dropped before responding
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// State carried through one `/swap` call
pub struct SwapContext {
    pub request_id: Uuid,
    pub started: Instant,
    /// Set once a workspace has been allocated
    pub workspace: Option<Arc<Workspace>>,
    pub event: SwapEvent,
    emitted: bool,
}

impl SwapContext {
    pub fn new(request_id: Uuid, environment: &str) -> Self {
        Self {
            request_id,
            started: Instant::now(),
            workspace: None,
            event: SwapEvent::new(request_id, Utc::now(), environment),
            emitted: false,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Record the time since `since` under `name`
    pub fn record_stage(&mut self, name: &str, since: Instant) {
        self.event
            .metric(name, since.elapsed().as_millis() as u64);
    }

    /// Finalize and emit the canonical log line
    pub fn finish(&mut self, status_code: u16) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        self.event.finalize(status_code, duration_ms);
        self.event.emit();
        self.emitted = true;
    }

    /// Emit the event as cancelled unless `finish` already ran.
    /// Returns whether anything was emitted.
    pub fn cancel(&mut self) -> bool {
        if self.emitted {
            return false;
        }
        let duration_ms = self.started.elapsed().as_millis() as u64;
        self.event.finalize(CLIENT_CLOSED_REQUEST, duration_ms);
        self.event.outcome = Outcome::Cancelled;
        self.event.emit();
        self.emitted = true;
        true
    }
}

impl Drop for SwapContext {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A produced output file inside the workspace
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub size_bytes: u64,
}

impl Artifact {
    /// Name the client sees for the download
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("output.{}", self.format.extension()))
    }
}

#[derive(Debug, Clone)]
pub enum SwapOutput {
    /// Send the artifact bytes in the response body
    Inline(Artifact),
    /// Artifact was uploaded and is reachable at `url`
    Uploaded { artifact: Artifact, url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfinished_context_is_reported_cancelled() {
        let mut ctx = SwapContext::new(Uuid::new_v4(), "test");
        ctx.event.source_size_bytes = Some(10);

        assert!(ctx.cancel());
        assert_eq!(ctx.event.status_code, CLIENT_CLOSED_REQUEST);
        assert_eq!(ctx.event.outcome, Outcome::Cancelled);
        assert!(!ctx.cancel());
    }

    #[test]
    fn test_finished_context_is_not_cancelled() {
        let mut ctx = SwapContext::new(Uuid::new_v4(), "test");
        ctx.finish(200);

        assert!(!ctx.cancel());
        assert_eq!(ctx.event.status_code, 200);
        assert_eq!(ctx.event.outcome, Outcome::Success);
    }
}
