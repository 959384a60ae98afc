//! The `/swap` request pipeline
//!
//! `form` stages the multipart upload into the request workspace, `service`
//! validates and runs the swap, and `respond` turns the produced artifact
//! into a response while tying workspace release to its lifetime.

mod form;
mod respond;
mod service;
mod types;

pub use respond::{error_response, success_response};
pub use service::run_swap;
pub use types::SwapContext;
