use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
    Extension,
};
use faceswap_core::AppError;

use crate::error::ErrorResponse;
use crate::middleware::RequestId;
use crate::services::swap::{self, SwapContext};
use crate::state::AppState;

/// Swap the face from `source` into `target`
///
/// Accepts a multipart form with the `source` face image, the `target` image
/// or video, and optional fields `output_format`, `keep_frames`, `keep_fps`,
/// `many_faces`, `skip_audio` and `use_cloud_storage`.
///
/// Returns the produced file inline, or a JSON document with its URL when
/// result storage is configured and `use_cloud_storage` is set.
#[utoipa::path(
    post,
    path = "/swap",
    tag = "swap",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Swapped image or video, or JSON with the result URL"),
        (status = 400, description = "Invalid input or no face detected", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Processing failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(request_id = %request_id.0, operation = "swap"))]
pub async fn swap_faces(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut ctx = SwapContext::new(request_id.0, state.config.environment());

    let result = match multipart {
        Ok(multipart) => swap::run_swap(&state, &mut ctx, multipart).await,
        Err(rejection) => Err(AppError::InvalidInput(format!(
            "Failed to read multipart: {}",
            rejection.body_text()
        ))),
    };

    let response = match result {
        Ok(output) => swap::success_response(&state, &mut ctx, output).await,
        Err(e) => swap::error_response(&state, &mut ctx, e),
    };

    ctx.finish(response.status().as_u16());
    response
}
