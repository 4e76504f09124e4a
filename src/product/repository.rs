use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewProduct, ProductModel};
use crate::shared::AppError;

/// Trait for product repository operations
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &NewProduct) -> Result<ProductModel, AppError>;
    async fn get_product(&self, product_id: i64) -> Result<Option<ProductModel>, AppError>;
    async fn list_products(&self) -> Result<Vec<ProductModel>, AppError>;
    async fn delete_product(&self, product_id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct ProductTable {
    next_id: i64,
    products: BTreeMap<i64, ProductModel>,
}

/// In-memory implementation of ProductRepository for development and testing
#[derive(Default)]
pub struct InMemoryProductRepository {
    table: Mutex<ProductTable>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProductTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn create_product(&self, product: &NewProduct) -> Result<ProductModel, AppError> {
        let mut table = self.lock();
        table.next_id += 1;
        let stored = product.clone().into_model(table.next_id);
        table.products.insert(stored.id, stored.clone());

        debug!(product_id = stored.id, "Product created in memory");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: i64) -> Result<Option<ProductModel>, AppError> {
        Ok(self.lock().products.get(&product_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<ProductModel>, AppError> {
        Ok(self.lock().products.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: i64) -> Result<(), AppError> {
        if self.lock().products.remove(&product_id).is_none() {
            warn!(product_id = product_id, "Product not found for deletion");
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }
}

const PRODUCT_COLUMNS: &str = "id, title, description, price, featured";

/// PostgreSQL implementation of product repository
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn create_product(&self, product: &NewProduct) -> Result<ProductModel, AppError> {
        sqlx::query_as::<_, ProductModel>(&format!(
            "INSERT INTO products (title, description, price, featured) \
             VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.featured)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create product in database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: i64) -> Result<Option<ProductModel>, AppError> {
        sqlx::query_as::<_, ProductModel>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, product_id = product_id, "Failed to fetch product");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<ProductModel>, AppError> {
        sqlx::query_as::<_, ProductModel>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list products");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, product_id = product_id, "Failed to delete product");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }
}
