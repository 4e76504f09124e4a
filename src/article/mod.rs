// Public API - what other modules can use
pub use handlers::{create_article, delete_article, get_article, list_articles, update_article};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
