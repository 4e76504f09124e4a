use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::models::{NewProduct, ProductModel};
use crate::shared::{AppError, AppState};
use crate::validation::json_object;

/// GET /product/list
#[instrument(name = "list_products", skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductModel>>, AppError> {
    let products = state.product_repository.list_products().await?;
    Ok(Json(products))
}

/// GET /product/:id
#[instrument(name = "get_product", skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductModel>, AppError> {
    state
        .product_repository
        .get_product(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// POST /product/create
#[instrument(name = "create_product", skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductModel>), AppError> {
    let product = NewProduct::from_payload(&json_object(payload)?)?;

    let stored = state.product_repository.create_product(&product).await?;
    info!(product_id = stored.id, title = %stored.title, "Product created");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// DELETE /product/:id
#[instrument(name = "delete_product", skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.product_repository.delete_product(product_id).await?;
    info!(product_id = product_id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
