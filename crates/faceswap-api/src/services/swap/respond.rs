use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use faceswap_core::{AppError, ErrorMetadata};
use faceswap_processing::ReleaseGuard;
use futures::Stream;
use serde_json::json;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::types::{Artifact, SwapContext, SwapOutput};
use crate::error::HttpAppError;
use crate::state::AppState;

/// File body that keeps its workspace alive until the body is dropped
struct GuardedStream<S> {
    inner: S,
    _guard: Option<ReleaseGuard>,
}

impl<S> Stream for GuardedStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn release_now(state: &AppState, ctx: &SwapContext) {
    if let Some(workspace) = ctx.workspace.clone() {
        state.workspaces.release(workspace);
    }
}

/// Render a failed swap and schedule workspace release.
pub fn error_response(state: &AppState, ctx: &mut SwapContext, error: AppError) -> Response {
    ctx.event.error_code = Some(error.error_code().to_string());
    ctx.event.error_message = Some(error.to_string());
    release_now(state, ctx);

    HttpAppError::new(error)
        .with_request_id(ctx.request_id)
        .in_production(state.config.is_production())
        .into_response()
}

/// Render a successful swap. Inline bodies own the workspace release.
pub async fn success_response(
    state: &AppState,
    ctx: &mut SwapContext,
    output: SwapOutput,
) -> Response {
    match output {
        SwapOutput::Uploaded { artifact, url } => {
            release_now(state, ctx);
            tracing::info!(
                request_id = %ctx.request_id,
                size_bytes = artifact.size_bytes,
                processing_time = ctx.elapsed_secs(),
                "Returning swap result URL"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "request_id": ctx.request_id.to_string(),
                    "url": url,
                    "processing_time": ctx.elapsed_secs(),
                })),
            )
                .into_response()
        }
        SwapOutput::Inline(artifact) => match inline_response(state, ctx, &artifact).await {
            Ok(response) => response,
            Err(e) => error_response(state, ctx, e),
        },
    }
}

async fn inline_response(
    state: &AppState,
    ctx: &SwapContext,
    artifact: &Artifact,
) -> Result<Response, AppError> {
    let file = File::open(&artifact.path).await?;

    let guard = ctx
        .workspace
        .clone()
        .and_then(|workspace| state.workspaces.schedule_release(workspace, true));
    let body = Body::from_stream(GuardedStream {
        inner: ReaderStream::new(file),
        _guard: guard,
    });

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::Internal(format!("Invalid download name: {}", e)))?;

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.format.mime_type()),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.size_bytes));

    tracing::info!(
        request_id = %ctx.request_id,
        size_bytes = artifact.size_bytes,
        mime = artifact.format.mime_type(),
        processing_time = ctx.elapsed_secs(),
        "Returning swap result inline"
    );

    Ok(response)
}
