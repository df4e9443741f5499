//! HTTP API for FraudGuard

pub mod errors;
pub mod handlers;
pub mod server;
pub mod validation;

pub use errors::{ApiError, ApiResult, ValidationError};
pub use server::{create_router, start_api_server, AppState};
