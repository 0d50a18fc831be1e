//! Core types for Orderdesk.
//!
//! This module provides type-safe wrappers for the catalog and cart concepts
//! the quantity engine works with.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::*;
pub use line_item::{CartLineItem, MAX_QUANTITY};
pub use price::{CurrencyCode, Price};
pub use product::{CatalogError, CatalogProduct, Packaging, Product, RestrictionIndicator};
