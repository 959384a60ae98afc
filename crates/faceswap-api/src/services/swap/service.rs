use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Multipart;
use faceswap_core::{AppError, MediaKind, OutputFormat, SwapParameters};
use faceswap_processing::{encode_image, FaceSwapper, FileRole, VideoJob, Workspace};
use faceswap_storage::result_key;

use super::form::read_swap_form;
use super::types::{Artifact, SwapContext, SwapOutput};
use crate::state::AppState;
use crate::telemetry::Delivery;

/// Validate, stage, process and deliver one swap request.
///
/// The allocated workspace is left in `ctx` so the caller can schedule its
/// release on every exit path.
#[tracing::instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn run_swap(
    state: &AppState,
    ctx: &mut SwapContext,
    multipart: Multipart,
) -> Result<SwapOutput, AppError> {
    let workspace = state.workspaces.create(ctx.request_id).await?;
    ctx.workspace = Some(Arc::clone(&workspace));

    let stage_start = Instant::now();
    let form = read_swap_form(multipart, &workspace).await?;
    ctx.record_stage("upload_ms", stage_start);
    ctx.event.source_size_bytes = Some(form.source.size_bytes);
    ctx.event.target_size_bytes = Some(form.target.size_bytes);
    tracing::debug!(
        source_name = ?form.source.file_name,
        target_name = ?form.target.file_name,
        params = ?form.params,
        "Swap form received"
    );

    let source = state.classifier.classify(&form.source.path).await;
    if !source.is_image() {
        return Err(AppError::InvalidInput(
            "Source file must be an image".to_string(),
        ));
    }

    let target = state.classifier.classify(&form.target.path).await;
    ctx.event.target_kind = Some(target.kind);
    if target.kind == MediaKind::Invalid {
        return Err(AppError::InvalidInput(
            "Target file must be an image or video".to_string(),
        ));
    }

    let params = form.params;
    let format = match target.kind {
        MediaKind::Video => params.output_format.video_container(),
        _ => params.output_format.image_encoding(),
    };
    ctx.event.output_format = Some(format);

    let wait_start = Instant::now();
    let _permit = Arc::clone(&state.swap_permits)
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("Swap limiter closed: {}", e)))?;
    ctx.record_stage("queue_ms", wait_start);

    let load_start = Instant::now();
    let swapper = state.models.get().await?;
    ctx.record_stage("model_ms", load_start);

    let output_name = format!("out.{}", format.extension());
    let output = workspace.stage(FileRole::Output, Some(output_name.as_str()))?;
    let swap_start = Instant::now();
    match target.kind {
        MediaKind::Video => {
            let job = VideoJob {
                source: form.source.path.clone(),
                target: form.target.path.clone(),
                output: output.clone(),
                params: SwapParameters {
                    output_format: format,
                    ..params.clone()
                },
            };
            swapper.swap_video(&job).await?;
        }
        _ => {
            swap_image_target(
                swapper.as_ref(),
                &form.source.path,
                &form.target.path,
                &output,
                format,
            )
            .await?;
        }
    }
    ctx.record_stage("swap_ms", swap_start);

    let artifact = verify_output(&output, format).await?;
    ctx.event.output_size_bytes = Some(artifact.size_bytes);

    Ok(deliver(state, ctx, &workspace, artifact, &params).await)
}

async fn swap_image_target(
    swapper: &dyn FaceSwapper,
    source: &Path,
    target: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<(), AppError> {
    let face = swapper
        .detect_single_face(source)
        .await?
        .ok_or(AppError::NoFaceDetected)?;

    let swapped = swapper.swap_image(&face, target).await?;
    encode_image(swapped, output, format).await?;
    Ok(())
}

async fn verify_output(path: &Path, format: OutputFormat) -> Result<Artifact, AppError> {
    let missing = || AppError::Processing("Failed to generate output file".to_string());

    let metadata = tokio::fs::metadata(path).await.map_err(|_| missing())?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Err(missing());
    }

    Ok(Artifact {
        path: path.to_path_buf(),
        format,
        size_bytes: metadata.len(),
    })
}

/// Upload when storage is configured and requested, falling back to inline
/// bytes if the upload fails.
async fn deliver(
    state: &AppState,
    ctx: &mut SwapContext,
    workspace: &Workspace,
    artifact: Artifact,
    params: &SwapParameters,
) -> SwapOutput {
    let storage = match (&state.storage, params.use_cloud_storage) {
        (Some(storage), true) => storage,
        _ => {
            ctx.event.delivery = Some(Delivery::Inline);
            return SwapOutput::Inline(artifact);
        }
    };

    let key = result_key(workspace.request_id(), &artifact.file_name());
    let upload_start = Instant::now();
    match storage
        .upload_file(&artifact.path, &key, artifact.format.mime_type())
        .await
    {
        Ok(url) => {
            ctx.record_stage("upload_result_ms", upload_start);
            ctx.event.delivery = Some(Delivery::Url);
            tracing::info!(key = %key, url = %url, "Result uploaded");
            SwapOutput::Uploaded { artifact, url }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                key = %key,
                backend = %storage.backend_type(),
                "Result upload failed, returning file inline"
            );
            ctx.event.delivery = Some(Delivery::FallbackInline);
            SwapOutput::Inline(artifact)
        }
    }
}
