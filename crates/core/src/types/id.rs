//! Buyer and product identifiers.
//!
//! Both arrive from outside the portal as plain integers: user ids from the
//! authentication layer, product ids from the catalog. They key local cart
//! snapshots (`cart:{user_id}`), remote cart URLs and cart lines, so each gets
//! its own type and a cart line can never be looked up by a user id.

/// Declare an integer identifier.
///
/// The generated type wraps an `i64`, serializes as the bare number (cart
/// snapshots store `"productId": 42`), prints as the number for storage keys
/// and URL segments, and orders numerically. `new`/`as_i64` and the `From`
/// conversions cover CLI arguments and wire values.
///
/// ```rust
/// # use orderdesk_core::define_id;
/// define_id!(WarehouseId);
///
/// let warehouse = WarehouseId::new(3);
/// assert_eq!(warehouse.to_string(), "3");
/// assert_eq!(i64::from(warehouse), 3);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Portal user (a buyer account); carts are scoped to exactly one.
define_id!(UserId);
// Catalog product, supplied by the external catalog.
define_id!(ProductId);
