//! Faceswap API Library
//!
//! HTTP handlers, middleware and application setup for the face swap service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod middleware;
mod services;
pub mod setup;
pub mod telemetry;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
