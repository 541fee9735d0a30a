//! Catalog product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Price, ProductId};

/// Category assigned when an admin leaves it blank.
pub const DEFAULT_CATEGORY: &str = "general";

/// A catalog product.
///
/// Deleting a product only clears `active`, so orders and reviews keep
/// pointing at a real row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub stock: i32,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields for a new product, already validated.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub stock: i32,
    pub category: String,
}

/// A partial product update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub active: Option<bool>,
}
