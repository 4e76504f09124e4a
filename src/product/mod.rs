// Public API - what other modules can use
pub use handlers::{create_product, delete_product, get_product, list_products};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod types;
