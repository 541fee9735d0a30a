//! Order status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Admins move orders between statuses freely; every status write also
/// stamps the matching `<status>_at` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed and awaiting shipment.
    #[default]
    Processing,
    Shipped,
    /// Received by the customer; unlocks reviews.
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The wire and database name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether customers may review products from an order in this status.
    #[must_use]
    pub const fn allows_reviews(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Whether the order counts towards revenue.
    #[must_use]
    pub const fn counts_as_revenue(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert!("returned".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_only_delivered_allows_reviews() {
        let reviewable: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::allows_reviews)
            .collect();
        assert_eq!(reviewable, vec![OrderStatus::Delivered]);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
