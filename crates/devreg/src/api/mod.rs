//! HTTP API module.
//!
//! Provides the REST endpoints of the device registry.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse, FORBIDDEN_MESSAGE, INVALID_CREDENTIALS};
pub use routes::create_router;
pub use state::AppState;
