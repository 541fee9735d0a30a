//! Catalog route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use bazaar_core::{Price, PriceError, ProductId};

use super::parse_id;
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{DEFAULT_CATEGORY, NewProduct, ProductChanges};
use crate::response::{created, message, ok};
use crate::state::AppState;

const REQUIRED: &str = "Name, description, price, image, and stock are required";

/// Product form posted by the admin dashboard.
///
/// Price and stock arrive as numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub image: Option<String>,
    pub stock: Option<Value>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

fn parse_price(raw: &Value) -> Result<Price> {
    let parsed: std::result::Result<Price, PriceError> = match raw {
        Value::Number(n) => n.to_string().parse(),
        Value::String(s) => s.parse(),
        _ => Err(PriceError::NotANumber(raw.to_string())),
    };
    parsed.map_err(|e| match e {
        PriceError::TooLarge => AppError::BadRequest(format!("Price cannot exceed {}", Price::MAX)),
        PriceError::Negative | PriceError::NotANumber(_) => {
            AppError::BadRequest("Price must be a non-negative number".to_string())
        }
    })
}

fn parse_stock(raw: &Value) -> Result<i32> {
    let value = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value
        .and_then(|v| i32::try_from(v).ok())
        .filter(|v| *v >= 0)
        .ok_or_else(|| AppError::BadRequest("Stock must be a non-negative integer".to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Validate a create form.
fn new_product(input: ProductInput) -> Result<NewProduct> {
    let required = || AppError::BadRequest(REQUIRED.to_string());

    let name = non_blank(input.name).ok_or_else(required)?;
    let description = non_blank(input.description).ok_or_else(required)?;
    let image = non_blank(input.image).ok_or_else(required)?;
    let price = input.price.as_ref().ok_or_else(required)?;
    let stock = input.stock.as_ref().ok_or_else(required)?;

    Ok(NewProduct {
        name,
        description,
        price: parse_price(price)?,
        image,
        stock: parse_stock(stock)?,
        category: non_blank(input.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
    })
}

/// A text field that may be left out of an update but not blanked.
fn changed_text(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(text) => non_blank(Some(text))
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{field} cannot be blank"))),
    }
}

/// Validate an update form. Absent fields stay unchanged.
fn product_changes(input: ProductInput) -> Result<ProductChanges> {
    Ok(ProductChanges {
        name: changed_text(input.name, "Name")?,
        description: changed_text(input.description, "Description")?,
        price: input.price.as_ref().map(parse_price).transpose()?,
        image: changed_text(input.image, "Image")?,
        stock: input.stock.as_ref().map(parse_stock).transpose()?,
        category: changed_text(input.category, "Category")?,
        active: input.active,
    })
}

fn not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => AppError::Database(other),
    }
}

/// List active products.
///
/// GET /api/products
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let products = state.catalog().active_products(&repo).await?;
    Ok(ok(products))
}

/// Show one active product.
///
/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ProductId = parse_id(&id, "product")?;
    let repo = ProductRepository::new(state.pool());
    let product = state
        .catalog()
        .active_product(&repo, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(ok(product))
}

/// Create a product.
///
/// POST /api/products
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn create(
    admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<impl IntoResponse> {
    let product = new_product(input)?;
    let product = ProductRepository::new(state.pool()).create(&product).await?;
    state.catalog().invalidate_all().await;

    tracing::info!(product_id = %product.id, "Product created");
    Ok(created(product))
}

/// Update a product.
///
/// PUT /api/products/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn update(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<impl IntoResponse> {
    let id: ProductId = parse_id(&id, "product")?;
    let changes = product_changes(input)?;
    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(not_found)?;
    state.catalog().invalidate_all().await;

    tracing::info!(product_id = %id, "Product updated");
    Ok(ok(product))
}

/// Soft-delete a product.
///
/// DELETE /api/products/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ProductId = parse_id(&id, "product")?;
    ProductRepository::new(state.pool())
        .deactivate(id)
        .await
        .map_err(not_found)?;
    state.catalog().invalidate_all().await;

    tracing::info!(product_id = %id, "Product deactivated");
    Ok(message("Product deleted successfully"))
}

/// List every product, including inactive ones.
///
/// GET /api/products/admin/all
pub async fn admin_index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(ok(products))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(value: Value) -> ProductInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_product_defaults_category() {
        let product = new_product(input(json!({
            "name": "Mug",
            "description": "Stoneware",
            "price": "12.50",
            "image": "/mug.jpg",
            "stock": 4
        })))
        .unwrap();
        assert_eq!(product.category, "general");
        assert_eq!(product.price, Price::from_cents(1250));
        assert_eq!(product.stock, 4);
    }

    #[test]
    fn test_new_product_accepts_zero_price_and_stock() {
        let product = new_product(input(json!({
            "name": "Sticker", "description": "Free", "price": 0,
            "image": "/s.png", "stock": "0"
        })))
        .unwrap();
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_new_product_requires_fields() {
        let err = new_product(input(json!({
            "name": "Mug", "description": "  ", "price": 1, "image": "/m.jpg", "stock": 1
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), format!("Bad request: {REQUIRED}"));

        assert!(new_product(input(json!({
            "name": "Mug", "description": "d", "price": 1, "image": "/m.jpg"
        })))
        .is_err());
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(new_product(input(json!({
            "name": "Mug", "description": "d", "price": -1, "image": "/m.jpg", "stock": 1
        })))
        .is_err());
        assert!(new_product(input(json!({
            "name": "Mug", "description": "d", "price": 1, "image": "/m.jpg", "stock": -1
        })))
        .is_err());
        assert!(parse_stock(&json!(2.5)).is_err());
    }

    #[test]
    fn test_price_above_column_range_rejected() {
        let form = |price: Value| {
            input(json!({
                "name": "Yacht", "description": "d", "price": price, "image": "/y.jpg", "stock": 1
            }))
        };

        let err = new_product(form(json!("100000000000"))).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Price cannot exceed 9999999999.99");
        assert!(new_product(form(json!(1e11))).is_err());
        assert!(new_product(form(json!("9999999999.99"))).is_ok());

        let err = product_changes(input(json!({ "price": 100_000_000_000_u64 }))).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Price cannot exceed 9999999999.99");
    }

    #[test]
    fn test_changes_reject_blank_text() {
        for field in ["name", "description", "image", "category"] {
            let err = product_changes(input(json!({ field: "  " }))).unwrap_err();
            assert!(
                matches!(&err, AppError::BadRequest(msg) if msg.ends_with("cannot be blank")),
                "{field}: {err}"
            );
        }

        let changes = product_changes(input(json!({ "description": " Glazed ", "image": "/m2.jpg" })))
            .unwrap();
        assert_eq!(changes.description.as_deref(), Some("Glazed"));
        assert_eq!(changes.image.as_deref(), Some("/m2.jpg"));
    }

    #[test]
    fn test_changes_are_partial() {
        let changes = product_changes(input(json!({ "stock": 7, "active": true, "price": null }))).unwrap();
        assert_eq!(changes.stock, Some(7));
        assert_eq!(changes.active, Some(true));
        assert!(changes.price.is_none());
        assert!(changes.name.is_none());
    }
}
