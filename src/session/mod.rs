// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use handlers::{create_session, revoke_session};
pub use middleware::{bearer_token, jwt_auth};
pub use types::{ResolvedSession, SessionClaims, SessionResponse};

// Internal modules
mod cleanup_task;
pub mod generators;
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;
mod types;
