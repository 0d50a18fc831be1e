//! Catalog products and their packaging attributes.
//!
//! Products are read-only inputs supplied by the external catalog. The only
//! part the quantity engine cares about is [`Packaging`]: how much free stock
//! exists and, once it runs out, the pack size the product must be ordered in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use rust_decimal::Decimal;

use super::id::ProductId;
use super::line_item::MAX_QUANTITY;
use super::price::{CurrencyCode, Price};

/// Errors that can occur when reading a catalog product.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The payload is not a valid catalog product.
    #[error("invalid catalog product: {0}")]
    Json(#[from] serde_json::Error),
    /// The product has an empty name.
    #[error("product {0} has an empty name")]
    EmptyName(ProductId),
    /// The product has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// The catalog's packaging-restriction indicator.
///
/// The catalog sends an untyped value. Only the literal `0`, as a number or as
/// the string `"0"`, marks a product as restricted; anything else, including a
/// missing value or `null`, leaves it unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestrictionIndicator {
    /// Must be ordered in whole packs once free stock is exhausted.
    Restricted,
    #[default]
    Unrestricted,
}

impl RestrictionIndicator {
    /// Classify a raw indicator value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let restricted = match value {
            Value::String(s) => s == "0",
            Value::Number(n) => n.as_i64() == Some(0) || n.as_u64() == Some(0),
            _ => false,
        };
        if restricted {
            Self::Restricted
        } else {
            Self::Unrestricted
        }
    }

    /// Returns `true` if the indicator marks the product as restricted.
    #[must_use]
    pub const fn is_restricted(self) -> bool {
        matches!(self, Self::Restricted)
    }
}

impl<'de> Deserialize<'de> for RestrictionIndicator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Stock and pack-size attributes that drive the quantity policy.
///
/// Construct through [`Packaging::new`] so the invariants hold:
/// `0 <= stock_available <= MAX_QUANTITY` and
/// `1 <= pack_quantity <= MAX_QUANTITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packaging {
    /// Units that can be ordered one at a time.
    pub stock_available: i64,
    /// Pack size once free stock is exhausted.
    pub pack_quantity: i64,
    /// Whether pack rounding applies at all.
    pub restricted: bool,
}

impl Packaging {
    /// Create packaging attributes, normalising out-of-range values.
    ///
    /// A pack quantity that is unset or `<= 0` becomes 1; negative stock
    /// becomes 0. Both are capped at [`MAX_QUANTITY`].
    #[must_use]
    pub fn new(stock_available: i64, pack_quantity: Option<i64>, restricted: bool) -> Self {
        Self {
            stock_available: stock_available.clamp(0, MAX_QUANTITY),
            pack_quantity: pack_quantity
                .filter(|p| *p > 0)
                .unwrap_or(1)
                .min(MAX_QUANTITY),
            restricted,
        }
    }

    /// Pack size in `1..=MAX_QUANTITY`, even for attributes deserialized
    /// from storage.
    #[must_use]
    pub const fn pack(&self) -> i64 {
        if self.pack_quantity < 1 {
            1
        } else if self.pack_quantity > MAX_QUANTITY {
            MAX_QUANTITY
        } else {
            self.pack_quantity
        }
    }

    /// Free stock in `0..=MAX_QUANTITY`.
    #[must_use]
    pub const fn stock(&self) -> i64 {
        if self.stock_available < 0 {
            0
        } else if self.stock_available > MAX_QUANTITY {
            MAX_QUANTITY
        } else {
            self.stock_available
        }
    }

    /// Packaging with no quantization at all.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            stock_available: 0,
            pack_quantity: 1,
            restricted: false,
        }
    }
}

impl Default for Packaging {
    fn default() -> Self {
        Self::unrestricted()
    }
}

/// A product as the catalog serves it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub currency_code: CurrencyCode,
    #[serde(default)]
    pub stock_available: Option<i64>,
    #[serde(default)]
    pub pack_quantity: Option<i64>,
    #[serde(default)]
    pub packaging_indicator: RestrictionIndicator,
}

/// A validated product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Price,
    pub packaging: Packaging,
}

impl Product {
    /// Parse a product from a catalog JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed or fails validation.
    pub fn from_catalog_json(json: &str) -> Result<Self, CatalogError> {
        let raw: CatalogProduct = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

impl TryFrom<CatalogProduct> for Product {
    type Error = CatalogError;

    fn try_from(raw: CatalogProduct) -> Result<Self, Self::Error> {
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName(raw.id));
        }
        if raw.price.is_sign_negative() {
            return Err(CatalogError::NegativePrice(raw.id));
        }

        let packaging = Packaging::new(
            raw.stock_available.unwrap_or(0),
            raw.pack_quantity,
            raw.packaging_indicator.is_restricted(),
        );

        Ok(Self {
            id: raw.id,
            name: name.to_owned(),
            sku: raw.sku.filter(|s| !s.trim().is_empty()),
            price: Price::new(raw.price, raw.currency_code),
            packaging,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indicator_zero_string_and_number_are_restricted() {
        assert!(RestrictionIndicator::from_value(&json!("0")).is_restricted());
        assert!(RestrictionIndicator::from_value(&json!(0)).is_restricted());
    }

    #[test]
    fn test_indicator_other_values_are_unrestricted() {
        for value in [
            json!(null),
            json!("1"),
            json!(1),
            json!(""),
            json!(" 0"),
            json!("00"),
            json!(false),
            json!([0]),
        ] {
            assert!(
                !RestrictionIndicator::from_value(&value).is_restricted(),
                "{value} should be unrestricted"
            );
        }
    }

    #[test]
    fn test_packaging_caps_at_line_capacity() {
        let packaging = Packaging::new(i64::MAX, Some(i64::MAX), true);
        assert_eq!(packaging.stock(), MAX_QUANTITY);
        assert_eq!(packaging.pack(), MAX_QUANTITY);

        let stored = Packaging {
            stock_available: i64::MAX,
            pack_quantity: i64::MAX,
            restricted: true,
        };
        assert_eq!(stored.stock(), MAX_QUANTITY);
        assert_eq!(stored.pack(), MAX_QUANTITY);
    }

    #[test]
    fn test_packaging_defaults() {
        let packaging = Packaging::new(-4, Some(0), true);
        assert_eq!(packaging.stock_available, 0);
        assert_eq!(packaging.pack_quantity, 1);

        let packaging = Packaging::new(5, None, true);
        assert_eq!(packaging.pack_quantity, 1);

        let packaging = Packaging::new(5, Some(-2), true);
        assert_eq!(packaging.pack_quantity, 1);
    }

    #[test]
    fn test_from_catalog_json_restricted() {
        let product = Product::from_catalog_json(
            r#"{"id": 9, "name": " Screws M4 ", "price": "0.15",
                "stockAvailable": 5, "packQuantity": 3, "packagingIndicator": "0"}"#,
        )
        .unwrap();

        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.name, "Screws M4");
        assert_eq!(product.packaging, Packaging::new(5, Some(3), true));
    }

    #[test]
    fn test_from_catalog_json_missing_fields_are_unrestricted() {
        let product =
            Product::from_catalog_json(r#"{"id": 1, "name": "Tape", "price": 2}"#).unwrap();
        assert!(!product.packaging.restricted);
        assert_eq!(product.packaging.pack_quantity, 1);
        assert_eq!(product.packaging.stock_available, 0);
    }

    #[test]
    fn test_from_catalog_json_null_indicator() {
        let product = Product::from_catalog_json(
            r#"{"id": 1, "name": "Tape", "price": 2, "packagingIndicator": null}"#,
        )
        .unwrap();
        assert!(!product.packaging.restricted);
    }

    #[test]
    fn test_from_catalog_json_rejects_empty_name() {
        let err = Product::from_catalog_json(r#"{"id": 3, "name": "  ", "price": 1}"#);
        assert!(matches!(err, Err(CatalogError::EmptyName(_))));
    }

    #[test]
    fn test_from_catalog_json_rejects_negative_price() {
        let err = Product::from_catalog_json(r#"{"id": 3, "name": "X", "price": "-1"}"#);
        assert!(matches!(err, Err(CatalogError::NegativePrice(_))));
    }

    #[test]
    fn test_from_catalog_json_malformed() {
        assert!(matches!(
            Product::from_catalog_json("{"),
            Err(CatalogError::Json(_))
        ));
    }
}
