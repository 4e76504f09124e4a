// Public API - what other modules can use
pub use handlers::{create_room, get_room, hello, list_rooms, user_in_room, SESSION_TOKEN_HEADER};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
