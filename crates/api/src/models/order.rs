//! Orders and their line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{CustomerId, OrderId, OrderItemId, OrderStatus, Price, ProductId};

/// Delivery address captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Names of required fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Name and email of the customer at the time of ordering.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

/// A line of an order; name, price and image are snapshots from the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(skip)]
    pub id: OrderItemId,
    #[serde(skip)]
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
    pub image: String,
}

/// Row of `shop.customer_order` before items are attached.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_info: sqlx::types::Json<ShippingInfo>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub processing_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "userId")]
    pub customer_id: CustomerId,
    pub user_info: UserInfo,
    pub items: Vec<OrderItem>,
    pub shipping_info: ShippingInfo,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Assemble an order from its row and items.
    #[must_use]
    pub fn from_parts(row: OrderRow, items: Vec<OrderItem>) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            user_info: UserInfo {
                name: row.customer_name,
                email: row.customer_email,
            },
            items,
            shipping_info: row.shipping_info.0,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            processing_at: row.processing_at,
            shipped_at: row.shipped_at,
            delivered_at: row.delivered_at,
            cancelled_at: row.cancelled_at,
        }
    }

    /// Whether any line of this order is for `product_id`.
    #[must_use]
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_blank_required() {
        let info = ShippingInfo {
            first_name: "Ada".to_string(),
            last_name: " ".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Loop Rd".to_string(),
            city: "Springfield".to_string(),
            ..ShippingInfo::default()
        };
        assert_eq!(info.missing_fields(), vec!["lastName", "zipCode", "country"]);
    }

    #[test]
    fn test_shipping_info_deserializes_camel_case() {
        let info: ShippingInfo = serde_json::from_str(
            r#"{"firstName":"Ada","zipCode":"12345","unknownField":true}"#,
        )
        .unwrap_or_default();
        assert_eq!(info.first_name, "Ada");
        assert_eq!(info.zip_code, "12345");
        assert!(info.phone.is_empty());
    }
}
