// Library crate for the music rooms server
// This file exposes the public API for the binary and integration tests

pub mod article;
pub mod config;
pub mod pages;
pub mod product;
pub mod room;
pub mod router;
pub mod session;
pub mod shared;
pub mod validation;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use room::{models::RoomModel, repository::RoomRepository};
pub use router::build_router;
pub use shared::{AppError, AppState};
