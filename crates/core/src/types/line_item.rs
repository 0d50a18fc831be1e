//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::{Packaging, Product};

/// Largest quantity a cart line can hold (`u32::MAX`).
pub const MAX_QUANTITY: i64 = 4_294_967_295;

/// One product in a cart.
///
/// Display fields and packaging attributes are copied from the [`Product`] when
/// the line is created, so a stored cart can be shown and edited without the
/// catalog. `quantity` is always at least 1; the store removes a line rather
/// than keep a non-positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub unit_price: Price,
    #[serde(default)]
    pub packaging: Packaging,
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a line for `product` with the given quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            unit_price: product.price,
            packaging: product.packaging,
            quantity,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// The quantity as the policy's signed integer type.
    #[must_use]
    pub fn quantity_i64(&self) -> i64 {
        i64::from(self.quantity)
    }
}
