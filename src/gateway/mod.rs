// Ballpark - Gateway Module
//
// HTTP surface: the axum router, the API key gate middleware, the caller
// identity extractor, and the JSON envelope/error translation.

mod auth;
mod caller;
mod protocol;
mod server;

pub use auth::{require_api_key, Authenticator, GateState, API_KEY_HEADER};
pub use protocol::{ErrorResponse, HealthResponse, SuccessResponse};
pub use server::{build_router, serve, AppState};
