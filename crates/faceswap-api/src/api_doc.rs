//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use faceswap_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Faceswap API",
        version = "0.1.0",
        description = "Swap the face from a source image into a target image or video. Results are returned inline or uploaded to result storage."
    ),
    paths(
        handlers::health::home,
        handlers::health::health,
        handlers::health::model_info,
        handlers::health::benchmark,
        handlers::swap::swap_faces,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HomeResponse,
        handlers::health::HealthResponse,
        handlers::health::ModelNames,
        handlers::health::ModelInfoResponse,
        handlers::health::BenchmarkResponse,
        models::SwapParameters,
        models::OutputFormat,
        models::MediaKind,
    )),
    tags(
        (name = "swap", description = "Face swap"),
        (name = "status", description = "Health and model status"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_all_operations() {
        let spec = get_openapi_spec();
        for path in ["/", "/health", "/model-info", "/benchmark", "/swap"] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
