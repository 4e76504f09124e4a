use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry. `price` is always held with two decimal places.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProductModel {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub featured: bool,
}

/// Validated product fields, before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub featured: bool,
}

impl NewProduct {
    pub fn into_model(self, id: i64) -> ProductModel {
        ProductModel {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            featured: self.featured,
        }
    }
}
