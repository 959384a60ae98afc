//! Data models for the application
//!
//! Domain types shared by processing and the HTTP layer.

mod media;
mod swap;

pub use media::*;
pub use swap::*;
