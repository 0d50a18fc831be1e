//! Orderdesk Core - cart types and quantity rules.
//!
//! This crate holds everything about a B2B cart that can be decided without
//! touching a disk or a network:
//! - `types` - ids, prices, catalog products and cart line items
//! - `quantity` - the packaging-constrained quantity policy and the per-field
//!   editing state machine built on it
//! - `cart` - the in-memory cart store and its observer hook
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and an in-memory store -
//! no I/O, no async, no logging. Persistence and synchronisation live in
//! `orderdesk-cart`, which plugs into [`cart::CartStore`] through
//! [`cart::CartObserver`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod quantity;
pub mod types;

pub use cart::{CartChange, CartObserver, CartStore};
pub use quantity::{QuantityField, QuantityPolicy, Zone, parse_quantity};
pub use types::*;
