//! # Axum Helpers
//!
//! Shared pieces for the account service's HTTP surface.
//!
//! - **[`errors`]**: `ErrorCode` and the `ErrorResponse` body every error renders to
//! - **[`extractors`]**: `ValidatedJson`, a JSON extractor that runs `validator` rules
//! - **[`server`]**: `create_router` (docs, health, tracing, 404 fallback) and `create_app`
//! - **[`shutdown`]**: SIGINT/SIGTERM future for `axum::serve(..).with_graceful_shutdown`

pub mod errors;
pub mod extractors;
pub mod server;
pub mod shutdown;

pub use errors::{ErrorCode, ErrorResponse, error_response, not_found};
pub use extractors::ValidatedJson;
pub use server::{create_app, create_router};
pub use shutdown::shutdown_signal;
