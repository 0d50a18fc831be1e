//! The cart for the signed-in user.
//!
//! [`CartSession`] is the one object a front end holds. It owns the
//! [`CartStore`], reconciles on user change, and routes every quantity edit
//! through [`QuantityPolicy`] before the store sees it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use orderdesk_core::{
    CartLineItem, CartStore, Product, ProductId, QuantityField, QuantityPolicy, UserId,
};

use crate::local::{LocalCartStorage, local_cart_key};
use crate::reconcile::{SnapshotSource, SyncMode, SyncReconciler};
use crate::remote::RemoteCartStore;
use crate::scheduler::PersistenceScheduler;

/// A user's cart session.
pub struct CartSession<L: LocalCartStorage, R: RemoteCartStore> {
    local: Arc<L>,
    reconciler: SyncReconciler<L, R>,
    scheduler: Arc<PersistenceScheduler<L, R>>,
    store: CartStore,
    user_id: Option<UserId>,
    mode: Option<SyncMode>,
}

impl<L: LocalCartStorage, R: RemoteCartStore> CartSession<L, R> {
    /// Create a signed-out session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(local: L, remote: R, persist_debounce: Duration) -> Self {
        Self::from_shared(Arc::new(local), Arc::new(remote), persist_debounce)
    }

    /// Create a signed-out session over shared collaborators.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn from_shared(local: Arc<L>, remote: Arc<R>, persist_debounce: Duration) -> Self {
        let scheduler = Arc::new(PersistenceScheduler::new(
            Arc::clone(&local),
            Arc::clone(&remote),
            persist_debounce,
        ));
        let mut store = CartStore::new();
        store.subscribe(scheduler.clone());

        Self {
            reconciler: SyncReconciler::new(Arc::clone(&local), remote),
            local,
            scheduler,
            store,
            user_id: None,
            mode: None,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Sync state of the signed-in user's cart.
    #[must_use]
    pub const fn mode(&self) -> Option<SyncMode> {
        self.mode
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.store
    }

    /// Returns `true` while a remote write is waiting for its quiet period.
    #[must_use]
    pub fn has_pending_write(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// React to the authenticated user changing.
    ///
    /// Switching to the user already signed in does nothing and returns
    /// `None`. Signing out clears the cart without persisting it. Signing in
    /// reconciles and returns where the loaded cart came from.
    #[instrument(skip(self), fields(from = ?self.user_id))]
    pub async fn switch_user(&mut self, user_id: Option<UserId>) -> Option<SnapshotSource> {
        if self.user_id == user_id {
            return None;
        }

        // Cancel before anything else so the previous user's pending write
        // cannot carry this cart.
        self.scheduler.unbind();
        self.store.clear();
        self.user_id = user_id;
        self.mode = None;

        let Some(user_id) = user_id else {
            info!("signed out, cart cleared");
            return None;
        };

        Some(self.start(user_id).await)
    }

    /// Reconcile again after a session fell back to local-only mode.
    ///
    /// Returns `None` when signed out or already synced.
    pub async fn retry_sync(&mut self) -> Option<SnapshotSource> {
        let user_id = self.user_id?;
        if self.mode != Some(SyncMode::LocalOnly) {
            return None;
        }
        self.scheduler.unbind();
        Some(self.start(user_id).await)
    }

    async fn start(&mut self, user_id: UserId) -> SnapshotSource {
        let reconciliation = self.reconciler.reconcile(user_id).await;
        self.store.load(reconciliation.items);
        self.scheduler.bind(user_id);
        self.mode = Some(reconciliation.mode);

        match reconciliation.source {
            // First sync from this device: upload after the quiet period.
            SnapshotSource::LocalPromoted => self.scheduler.schedule(self.store.items()),
            SnapshotSource::Remote | SnapshotSource::Empty => {
                if let Err(e) = self
                    .local
                    .write(&local_cart_key(user_id), self.store.items())
                {
                    warn!(user_id = %user_id, error = %e, "failed to mirror cart locally");
                }
            }
            SnapshotSource::LocalFallback => {}
        }

        reconciliation.source
    }

    /// Add `product`, `quantity` defaulting to the policy's initial quantity.
    ///
    /// The requested quantity and the resulting line are normalized, so a
    /// restricted product stays on its pack grid. Non-positive requests are
    /// ignored. Returns the line's new quantity.
    pub fn add_product(&mut self, product: &Product, quantity: Option<i64>) -> Option<i64> {
        let policy = QuantityPolicy::for_product(product);
        let requested = quantity.unwrap_or_else(|| policy.initial());
        if requested <= 0 {
            return None;
        }

        let existing = self
            .store
            .get(product.id)
            .map_or(0, CartLineItem::quantity_i64);
        let requested = policy.normalize_on_blur(requested);
        let target = policy.normalize_on_blur(existing.saturating_add(requested));

        match u32::try_from(target - existing) {
            Ok(delta) if delta > 0 => self.store.add(product, delta),
            _ => self.store.set_quantity(product.id, target),
        }
        Some(target)
    }

    /// Press "+" on a line. Returns the new quantity.
    pub fn step_up(&mut self, product_id: ProductId) -> Option<i64> {
        let mut field = self.edit(product_id)?;
        let quantity = field.step_up();
        self.store.set_quantity(product_id, quantity);
        Some(quantity)
    }

    /// Press "-" on a line. Never removes the line. Returns the new quantity.
    pub fn step_down(&mut self, product_id: ProductId) -> Option<i64> {
        let mut field = self.edit(product_id)?;
        let quantity = field.step_down();
        self.store.set_quantity(product_id, quantity);
        Some(quantity)
    }

    /// An editing field for a line, seeded with its quantity.
    #[must_use]
    pub fn edit(&self, product_id: ProductId) -> Option<QuantityField> {
        let line = self.store.get(product_id)?;
        Some(QuantityField::new(
            QuantityPolicy::new(line.packaging),
            line.quantity_i64(),
        ))
    }

    /// Commit a field's value on blur. Returns the stored quantity.
    pub fn commit(&mut self, product_id: ProductId, field: &mut QuantityField) -> Option<i64> {
        self.store.get(product_id)?;
        let quantity = field.blur();
        self.store.set_quantity(product_id, quantity);
        Some(quantity)
    }

    /// Normalize `quantity` against the line's packaging and store it.
    pub fn commit_quantity(&mut self, product_id: ProductId, quantity: i64) -> Option<i64> {
        let line = self.store.get(product_id)?;
        let quantity = QuantityPolicy::new(line.packaging).normalize_on_blur(quantity);
        self.store.set_quantity(product_id, quantity);
        Some(quantity)
    }

    /// Remove a line.
    pub fn remove(&mut self, product_id: ProductId) {
        self.store.remove(product_id);
    }

    /// Empty the cart (persisted like any other change).
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Write any pending snapshot to the remote now.
    pub async fn flush(&self) -> bool {
        self.scheduler.flush().await
    }

    /// Cancel any pending remote write, e.g. when the front end unmounts.
    pub fn shutdown(&self) {
        self.scheduler.cancel();
    }
}

impl<L: LocalCartStorage, R: RemoteCartStore> Drop for CartSession<L, R> {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}
