//! Multipart form staging
//!
//! File parts are streamed chunk by chunk into the request workspace so an
//! upload is never held in memory as a whole.

use std::path::PathBuf;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use faceswap_core::{AppError, SwapParameters};
use faceswap_processing::{FileRole, Workspace};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const SOURCE_FIELD: &str = "source";
const TARGET_FIELD: &str = "target";

/// A file part written into the workspace
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub file_name: Option<String>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct SwapForm {
    pub source: StagedUpload,
    pub target: StagedUpload,
    pub params: SwapParameters,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", e.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

async fn stage_field(
    mut field: Field<'_>,
    role: FileRole,
    workspace: &Workspace,
) -> Result<StagedUpload, AppError> {
    let file_name = field.file_name().map(str::to_string);
    let path = workspace.stage(role, file_name.as_deref())?;

    let mut file = File::create(&path).await?;
    let mut size_bytes = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size_bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    tracing::debug!(
        request_id = %workspace.request_id(),
        role = role.as_str(),
        size_bytes,
        "Upload staged"
    );

    Ok(StagedUpload {
        path,
        file_name,
        size_bytes,
    })
}

/// Drain a part nobody asked for
async fn discard_field(mut field: Field<'_>) -> Result<(), AppError> {
    while field.chunk().await.map_err(multipart_error)?.is_some() {}
    Ok(())
}

/// Read the whole form, staging `source` and `target` and parsing the
/// option fields.
pub async fn read_swap_form(
    mut multipart: Multipart,
    workspace: &Workspace,
) -> Result<SwapForm, AppError> {
    let mut source: Option<StagedUpload> = None;
    let mut target: Option<StagedUpload> = None;
    let mut params = SwapParameters::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string).unwrap_or_default();

        match name.as_str() {
            SOURCE_FIELD | TARGET_FIELD => {
                let (slot, role) = if name == SOURCE_FIELD {
                    (&mut source, FileRole::Source)
                } else {
                    (&mut target, FileRole::Target)
                };
                if slot.is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "Multiple {} files are not allowed",
                        name
                    )));
                }
                *slot = Some(stage_field(field, role, workspace).await?);
            }
            _ if field.file_name().is_some() => discard_field(field).await?,
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                params.apply_field(&name, &value)?;
            }
        }
    }

    match (source, target) {
        (Some(source), Some(target)) => Ok(SwapForm {
            source,
            target,
            params,
        }),
        _ => Err(AppError::InvalidInput(
            "Both source and target files are required".to_string(),
        )),
    }
}
