//! Catalog seeding from YAML.
//!
//! ```yaml
//! products:
//!   - name: Linen Tote
//!     description: Sturdy everyday bag
//!     price: 24.50
//!     image: /images/tote.jpg
//!     stock: 40
//!     category: bags
//! ```
//!
//! `description`, `image` and `category` are optional; `category` defaults
//! to `general` and `stock` to 0.

use std::path::Path;

use serde::Deserialize;

use bazaar_api::db::ProductRepository;
use bazaar_api::models::product::{DEFAULT_CATEGORY, NewProduct};
use bazaar_core::Price;

use super::{CommandError, connect};

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedProduct {
    name: String,
    #[serde(default)]
    description: String,
    price: Price,
    #[serde(default)]
    image: String,
    #[serde(default)]
    stock: i32,
    category: Option<String>,
}

/// Parse and validate a seed file.
fn parse_products(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    file.products
        .into_iter()
        .enumerate()
        .map(|(index, p)| {
            let invalid = |reason: &str| CommandError::InvalidProduct {
                index: index + 1,
                reason: reason.to_string(),
            };
            let name = p.name.trim();
            if name.is_empty() {
                return Err(invalid("name is required"));
            }
            if p.stock < 0 {
                return Err(invalid("stock cannot be negative"));
            }
            Ok(NewProduct {
                name: name.to_string(),
                description: p.description,
                price: p.price,
                image: p.image,
                stock: p.stock,
                category: p
                    .category
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            })
        })
        .collect()
}

/// Load products from `path`.
///
/// The file is fully validated before the database is touched, and the
/// import itself is a single transaction: with `replace`, a failure part way
/// through leaves the existing catalog active.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry is
/// invalid, or a database operation fails.
pub async fn products(path: &Path, replace: bool) -> Result<(), CommandError> {
    tracing::info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let products = parse_products(&content)?;
    tracing::info!(count = products.len(), "Parsed seed file");

    let pool = connect().await?;
    let import = ProductRepository::new(&pool)
        .import(&products, replace)
        .await?;

    if replace {
        tracing::info!(removed = import.deactivated, "Deactivated existing products");
    }
    for created in &import.created {
        tracing::info!(product_id = %created.id, name = %created.name, "Product created");
    }

    tracing::info!(count = import.created.len(), "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let products = parse_products(
            r"
products:
  - name: Linen Tote
    price: 24.5
  - name: Mug
    price: '9.99'
    stock: 12
    category: kitchen
",
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category, DEFAULT_CATEGORY);
        assert_eq!(products[0].stock, 0);
        assert_eq!(products[0].price, Price::from_cents(2450));
        assert_eq!(products[1].price, Price::from_cents(999));
        assert_eq!(products[1].category, "kitchen");
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = parse_products("products:\n  - name: '  '\n    price: 1\n").unwrap_err();
        assert!(matches!(err, CommandError::InvalidProduct { index: 1, .. }));
    }

    #[test]
    fn test_negative_stock_rejected() {
        let err = parse_products("products:\n  - name: A\n    price: 1\n    stock: -2\n")
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidProduct { .. }));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(matches!(
            parse_products("products:\n  - name: A\n    price: -1\n"),
            Err(CommandError::Yaml(_))
        ));
    }

    #[test]
    fn test_oversized_price_rejected() {
        assert!(matches!(
            parse_products("products:\n  - name: A\n    price: 100000000000\n"),
            Err(CommandError::Yaml(_))
        ));
        assert!(parse_products("products:\n  - name: A\n    price: '9999999999.99'\n").is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_products("products:\n  - name: A\n    price: 1\n    colour: red\n").is_err());
    }
}
