//! In-memory cart store.
//!
//! The store keeps line items most-recently-touched first and enforces one
//! invariant: a stored quantity is always a positive integer. It knows nothing
//! about packaging; callers normalize with [`crate::QuantityPolicy`] before
//! writing when the policy must hold.
//!
//! Every mutating call notifies each subscribed [`CartObserver`] exactly once,
//! in call order, with the resulting items. Coalescing is the observer's job.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::types::{CartLineItem, CurrencyCode, Price, Product, ProductId};

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A product was added or its quantity increased.
    Added { product_id: ProductId, quantity: u32 },
    /// A line was removed, or a removal was requested for an absent line.
    Removed { product_id: ProductId },
    /// A line's quantity was replaced.
    QuantitySet { product_id: ProductId, quantity: u32 },
    /// The cart was emptied.
    Cleared,
}

/// Receives a callback after every cart mutation.
pub trait CartObserver: Send + Sync {
    /// Called once per mutation with the cart as it is afterwards.
    fn cart_changed(&self, change: &CartChange, items: &[CartLineItem]);
}

/// Ordered collection of cart lines.
#[derive(Default)]
pub struct CartStore {
    items: Vec<CartLineItem>,
    observers: Vec<Arc<dyn CartObserver>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CartStore {
    /// An empty cart with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for all later mutations.
    pub fn subscribe(&mut self, observer: Arc<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// Replace the contents with a reconciled snapshot.
    ///
    /// This installs initial state and does not notify observers. Lines with a
    /// zero quantity are dropped and repeated product ids keep their first
    /// occurrence.
    pub fn load(&mut self, items: Vec<CartLineItem>) {
        let mut loaded: Vec<CartLineItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 || loaded.iter().any(|l| l.product_id == item.product_id) {
                continue;
            }
            loaded.push(item);
        }
        self.items = loaded;
    }

    /// Add `quantity` of `product`, moving its line to the front.
    ///
    /// An existing line has `quantity` added to it. A zero quantity on a new
    /// line does not create it.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let line = match self.position(product.id) {
            Some(index) => {
                let mut line = self.items.remove(index);
                line.quantity = line.quantity.saturating_add(quantity);
                Some(line)
            }
            None if quantity > 0 => Some(CartLineItem::from_product(product, quantity)),
            None => None,
        };
        if let Some(line) = line {
            self.items.insert(0, line);
        }

        self.notify(&CartChange::Added {
            product_id: product.id,
            quantity,
        });
    }

    /// Remove a line. Removing an absent line is not an error.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|l| l.product_id != product_id);
        self.notify(&CartChange::Removed { product_id });
    }

    /// Replace a line's quantity; a non-positive quantity removes the line.
    ///
    /// Quantities above what a line can hold saturate at `u32::MAX`. Setting a
    /// quantity for a product that is not in the cart does nothing beyond
    /// notifying observers.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
        self.notify(&CartChange::QuantitySet {
            product_id,
            quantity,
        });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.notify(&CartChange::Cleared);
    }

    /// Lines, most recently touched first.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|l| l.product_id == product_id)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of line totals, in the currency of the first line.
    ///
    /// Lines priced in another currency are skipped; the portal prices a
    /// buyer's whole catalog in one currency.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |l| l.unit_price.currency_code);
        let amount = self
            .items
            .iter()
            .filter(|l| l.unit_price.currency_code == currency)
            .map(|l| l.line_total().amount)
            .sum::<Decimal>();
        Price::new(amount, currency)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|l| l.product_id == product_id)
    }

    fn notify(&self, change: &CartChange) {
        for observer in &self.observers {
            observer.cart_changed(change, &self.items);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::Packaging;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(CartChange, Vec<ProductId>)>>,
    }

    impl CartObserver for Recorder {
        fn cart_changed(&self, change: &CartChange, items: &[CartLineItem]) {
            self.calls
                .lock()
                .unwrap()
                .push((*change, items.iter().map(|l| l.product_id).collect()));
        }
    }

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            sku: None,
            price: Price::new(Decimal::new(250, 2), CurrencyCode::EUR),
            packaging: Packaging::unrestricted(),
        }
    }

    fn ids(store: &CartStore) -> Vec<i64> {
        store.items().iter().map(|l| l.product_id.as_i64()).collect()
    }

    #[test]
    fn test_add_inserts_at_front() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.add(&product(2), 1);
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_add_existing_sums_and_moves_to_front() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.add(&product(2), 1);
        store.add(&product(1), 3);
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 5);
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.set_quantity(ProductId::new(1), 7);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 7);
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.add(&product(2), 2);
        store.set_quantity(ProductId::new(1), 0);
        store.set_quantity(ProductId::new(2), -3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_past_line_capacity_saturates() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.set_quantity(ProductId::new(1), 5_000_000_000);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, u32::MAX);

        store.set_quantity(ProductId::new(1), i64::MAX);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_set_quantity_keeps_position() {
        let mut store = CartStore::new();
        store.add(&product(1), 1);
        store.add(&product(2), 1);
        store.set_quantity(ProductId::new(1), 4);
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_remove_absent_is_not_an_error() {
        let mut store = CartStore::new();
        store.remove(ProductId::new(99));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = CartStore::new();
        store.add(&product(1), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_every_mutation_notifies_once_in_order() {
        let recorder = Arc::new(Recorder::default());
        let mut store = CartStore::new();
        store.subscribe(recorder.clone());

        store.add(&product(1), 2);
        store.add(&product(2), 1);
        store.set_quantity(ProductId::new(1), 3);
        store.remove(ProductId::new(42));
        store.set_quantity(ProductId::new(2), 0);
        store.clear();

        let calls = recorder.calls.lock().unwrap();
        let changes: Vec<CartChange> = calls.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            changes,
            vec![
                CartChange::Added {
                    product_id: ProductId::new(1),
                    quantity: 2
                },
                CartChange::Added {
                    product_id: ProductId::new(2),
                    quantity: 1
                },
                CartChange::QuantitySet {
                    product_id: ProductId::new(1),
                    quantity: 3
                },
                CartChange::Removed {
                    product_id: ProductId::new(42)
                },
                CartChange::Removed {
                    product_id: ProductId::new(2)
                },
                CartChange::Cleared,
            ]
        );
        assert_eq!(calls.get(1).unwrap().1, vec![ProductId::new(2), ProductId::new(1)]);
        assert_eq!(calls.get(4).unwrap().1, vec![ProductId::new(1)]);
    }

    #[test]
    fn test_load_does_not_notify_and_sanitizes() {
        let recorder = Arc::new(Recorder::default());
        let mut store = CartStore::new();
        store.subscribe(recorder.clone());

        let mut zero = CartLineItem::from_product(&product(3), 1);
        zero.quantity = 0;
        store.load(vec![
            CartLineItem::from_product(&product(1), 2),
            zero,
            CartLineItem::from_product(&product(1), 9),
            CartLineItem::from_product(&product(2), 1),
        ]);

        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(ProductId::new(1)).unwrap().quantity, 2);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_totals() {
        let mut store = CartStore::new();
        store.add(&product(1), 2);
        store.add(&product(2), 3);
        assert_eq!(store.item_count(), 5);
        assert_eq!(store.subtotal().amount, Decimal::new(1250, 2));
        assert_eq!(store.subtotal().currency_code, CurrencyCode::EUR);
        assert_eq!(CartStore::new().subtotal().amount, Decimal::ZERO);
    }
}
