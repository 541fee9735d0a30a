//! Cart pricing and order placement.
//!
//! Lines are always priced from the catalog. The client's copy of name,
//! price and total is only used for error messages and a sanity check.
//!
//! Placing an order runs in one transaction: the products are locked
//! (`FOR UPDATE`, ascending ID), validated, the order is inserted and stock
//! is decremented with a guarded update. Two customers racing for the last
//! unit therefore cannot both succeed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use bazaar_core::{CustomerId, Price, PriceError, ProductId};

use crate::db::RepositoryError;
use crate::db::orders::{self, ItemSnapshot, OrderHeader};
use crate::db::products::{self, StockRow};
use crate::models::{Order, ShippingInfo};

/// Errors that reject a cart or an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Items, shipping info, and total amount are required")]
    MissingFields,

    #[error("Missing shipping information: {}", .0.join(", "))]
    IncompleteShipping(Vec<&'static str>),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStock { name: String, available: i32 },

    #[error("Order total cannot exceed {}", Price::MAX)]
    TotalTooLarge,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<PriceError> for CheckoutError {
    fn from(_: PriceError) -> Self {
        Self::TotalTooLarge
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A cart line as posted by the SPA.
///
/// `name` is only used to label errors; `price` and `image` are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<LineInput>,
    pub shipping_info: Option<ShippingInfo>,
    pub total_amount: Option<Decimal>,
}

/// The customer placing an order, as named in their token.
#[derive(Debug, Clone)]
pub struct Buyer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

/// A cart line after merging duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedLine {
    pub product_id: ProductId,
    pub quantity: i32,
    label: Option<String>,
}

impl MergedLine {
    /// Name used in error messages: the client's label, else the ID.
    fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.product_id.to_string())
    }
}

/// Merge lines for the same product, keeping first-seen order.
///
/// # Errors
///
/// Returns `CheckoutError::InvalidQuantity` if any quantity is below 1 or a
/// merged quantity overflows.
pub fn merge_lines(lines: &[LineInput]) -> Result<Vec<MergedLine>, CheckoutError> {
    let mut merged: Vec<MergedLine> = Vec::with_capacity(lines.len());

    for line in lines {
        if line.quantity < 1 {
            return Err(CheckoutError::InvalidQuantity);
        }
        let quantity = i32::try_from(line.quantity).map_err(|_| CheckoutError::InvalidQuantity)?;

        if let Some(existing) = merged.iter_mut().find(|m| m.product_id == line.product_id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CheckoutError::InvalidQuantity)?;
        } else {
            merged.push(MergedLine {
                product_id: line.product_id,
                quantity,
                label: line.name.clone().filter(|n| !n.trim().is_empty()),
            });
        }
    }

    Ok(merged)
}

/// Lines priced from the catalog, ready to insert.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub items: Vec<ItemSnapshot>,
    pub total: Price,
}

/// Price merged lines against catalog rows, enforcing availability and stock.
///
/// # Errors
///
/// Returns `CheckoutError::ProductNotFound` for unknown or inactive products,
/// `CheckoutError::InsufficientStock` when a line wants more than is left and
/// `CheckoutError::TotalTooLarge` when the order total is not storable.
pub fn price_lines(lines: &[MergedLine], catalog: &[StockRow]) -> Result<PricedOrder, CheckoutError> {
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let row = catalog
            .iter()
            .find(|row| row.id == line.product_id && row.active)
            .ok_or_else(|| CheckoutError::ProductNotFound(line.label()))?;

        if row.stock < line.quantity {
            return Err(CheckoutError::InsufficientStock {
                name: row.name.clone(),
                available: row.stock,
            });
        }

        items.push(ItemSnapshot {
            product_id: row.id,
            name: row.name.clone(),
            price: row.price,
            quantity: line.quantity,
            image: row.image.clone(),
        });
    }

    let line_totals = items
        .iter()
        .map(|item| item.price.times(item.quantity.unsigned_abs()))
        .collect::<Result<Vec<_>, _>>()?;
    let total = Price::total(line_totals)?;

    Ok(PricedOrder { items, total })
}

/// Validate the request shape and return merged lines, shipping info and the
/// client's total.
fn validate(request: PlaceOrderRequest) -> Result<(Vec<MergedLine>, ShippingInfo, Decimal), CheckoutError> {
    let (Some(shipping), Some(total)) = (request.shipping_info, request.total_amount) else {
        return Err(CheckoutError::MissingFields);
    };
    if request.items.is_empty() || total <= Decimal::ZERO {
        return Err(CheckoutError::MissingFields);
    }

    let missing = shipping.missing_fields();
    if !missing.is_empty() {
        return Err(CheckoutError::IncompleteShipping(missing));
    }

    Ok((merge_lines(&request.items)?, shipping, total))
}

/// Place an order atomically.
///
/// # Errors
///
/// Returns a validation variant of `CheckoutError` for bad requests, and
/// `CheckoutError::Repository` if the database fails. On any error nothing
/// is written.
#[tracing::instrument(skip_all, fields(customer_id = %buyer.id))]
pub async fn place_order(
    pool: &PgPool,
    buyer: &Buyer,
    request: PlaceOrderRequest,
) -> Result<Order, CheckoutError> {
    let (lines, shipping_info, client_total) = validate(request)?;

    let mut ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();

    let mut tx = pool.begin().await?;

    let rows = products::lock_for_checkout(&mut tx, &ids).await?;
    let priced = price_lines(&lines, &rows)?;

    if priced.total.differs_from(client_total) {
        tracing::warn!(
            client_total = %client_total,
            catalog_total = %priced.total,
            "Client total differs from catalog prices; using catalog total"
        );
    }

    let header = OrderHeader {
        customer_id: buyer.id,
        customer_name: &buyer.name,
        customer_email: &buyer.email,
        shipping_info: &shipping_info,
        total_amount: priced.total,
    };
    let order = orders::insert(&mut tx, &header, &priced.items).await?;

    for item in &priced.items {
        if !products::take_stock(&mut tx, item.product_id, item.quantity).await? {
            let available = rows
                .iter()
                .find(|row| row.id == item.product_id)
                .map_or(0, |row| row.stock);
            return Err(CheckoutError::InsufficientStock {
                name: item.name.clone(),
                available,
            });
        }
    }

    tx.commit().await?;

    tracing::info!(order_id = %order.id, total = %order.total_amount, "Order placed");
    Ok(order)
}

/// One line of a cart quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub unit_price: Option<Price>,
    pub quantity: i32,
    pub line_total: Price,
    /// Whether the product exists and is on sale.
    pub available: bool,
    /// Whether enough stock is left for the requested quantity.
    pub in_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

/// Catalog pricing of a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub subtotal: Price,
    pub item_count: i32,
}

/// Price a cart without failing on unavailable products.
///
/// Unknown or inactive products are reported with `available = false` and
/// left out of the subtotal.
///
/// # Errors
///
/// Returns `CheckoutError::TotalTooLarge` if a line total or the subtotal
/// exceeds [`Price::MAX`].
pub fn quote(lines: &[MergedLine], catalog: &[StockRow]) -> Result<Quote, CheckoutError> {
    let lines = lines
        .iter()
        .map(|line| -> Result<QuoteLine, CheckoutError> {
            Ok(match catalog
                .iter()
                .find(|row| row.id == line.product_id && row.active)
            {
                Some(row) => QuoteLine {
                    product_id: row.id,
                    name: Some(row.name.clone()),
                    image: Some(row.image.clone()),
                    unit_price: Some(row.price),
                    quantity: line.quantity,
                    line_total: row.price.times(line.quantity.unsigned_abs())?,
                    available: true,
                    in_stock: row.stock >= line.quantity,
                    stock: Some(row.stock),
                },
                None => QuoteLine {
                    product_id: line.product_id,
                    name: line.label.clone(),
                    image: None,
                    unit_price: None,
                    quantity: line.quantity,
                    line_total: Price::ZERO,
                    available: false,
                    in_stock: false,
                    stock: None,
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let priced = lines.iter().filter(|line| line.available);
    let subtotal = Price::total(priced.clone().map(|line| line.line_total))?;
    let item_count = priced.map(|line| line.quantity).fold(0_i32, i32::saturating_add);

    Ok(Quote {
        lines,
        subtotal,
        item_count,
    })
}
