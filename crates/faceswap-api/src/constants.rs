//! API constants

/// Service name reported in logs and the OpenAPI document
pub const SERVICE_NAME: &str = "faceswap";

/// Response header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Edge length of the synthetic benchmark image
pub const BENCHMARK_IMAGE_SIZE: u32 = 100;

pub const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /model-info",
    "GET /benchmark",
    "POST /swap",
    "GET /api/openapi.json",
    "GET /docs",
];
