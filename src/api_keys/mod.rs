// Ballpark - API Keys Module
//
// Lifecycle management for service credentials (create, rotate, set status,
// delete, show) and the authentication lookup used by the HTTP gate.

mod service;
mod types;

pub use service::ApiKeysService;
pub use types::{ApiClient, ApiKeyPublic, DeletedKey, IssuedKey, ServiceName};
pub use crate::store::ApiKeyStatus;
