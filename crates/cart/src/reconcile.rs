//! Choosing the authoritative cart when a session starts.
//!
//! Reconciliation is snapshot selection, not merging: a non-empty remote
//! cart wins outright, an empty remote cart lets a non-empty local cart be
//! promoted (the first upload from this device). Lines added offline on one
//! device are discarded if another device already wrote a non-empty cart.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use orderdesk_core::{CartLineItem, UserId};

use crate::local::{LocalCartStorage, local_cart_key};
use crate::remote::RemoteCartStore;

/// Where the winning snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// The remote cart was non-empty.
    Remote,
    /// The remote cart was empty and the local one was not.
    LocalPromoted,
    /// The remote could not be fetched; the local snapshot was used.
    LocalFallback,
    /// Both snapshots were empty.
    Empty,
}

/// Whether the session is in step with the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// The remote was read successfully.
    Synced,
    /// The remote fetch failed; the cart is device-local until the next
    /// successful fetch.
    LocalOnly,
}

/// Outcome of reconciling one user's snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub items: Vec<CartLineItem>,
    pub source: SnapshotSource,
    pub mode: SyncMode,
}

/// Pick the authoritative snapshot from a successfully fetched remote and
/// the local snapshot.
#[must_use]
pub fn select_snapshot(
    local: Vec<CartLineItem>,
    remote: Vec<CartLineItem>,
) -> (Vec<CartLineItem>, SnapshotSource) {
    if !remote.is_empty() {
        (remote, SnapshotSource::Remote)
    } else if !local.is_empty() {
        (local, SnapshotSource::LocalPromoted)
    } else {
        (Vec::new(), SnapshotSource::Empty)
    }
}

/// Reads both snapshots for a user and selects the winner.
pub struct SyncReconciler<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
}

impl<L, R> Clone for SyncReconciler<L, R> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
        }
    }
}

impl<L: LocalCartStorage, R: RemoteCartStore> SyncReconciler<L, R> {
    /// Create a reconciler over the given collaborators.
    #[must_use]
    pub const fn new(local: Arc<L>, remote: Arc<R>) -> Self {
        Self { local, remote }
    }

    /// Reconcile the local and remote snapshots for `user_id`.
    ///
    /// Never fails: an unreadable local snapshot counts as absent and a
    /// failed remote fetch falls back to the local snapshot in
    /// [`SyncMode::LocalOnly`].
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn reconcile(&self, user_id: UserId) -> Reconciliation {
        let local = self.read_local(user_id);

        let reconciliation = match self.remote.fetch_cart(user_id).await {
            Ok(remote) => {
                let (items, source) = select_snapshot(local, remote);
                Reconciliation {
                    items,
                    source,
                    mode: SyncMode::Synced,
                }
            }
            Err(e) => {
                warn!(error = %e, "remote cart fetch failed, using local snapshot");
                Reconciliation {
                    items: local,
                    source: SnapshotSource::LocalFallback,
                    mode: SyncMode::LocalOnly,
                }
            }
        };

        info!(
            source = ?reconciliation.source,
            mode = ?reconciliation.mode,
            items = reconciliation.items.len(),
            "cart reconciled"
        );
        reconciliation
    }

    fn read_local(&self, user_id: UserId) -> Vec<CartLineItem> {
        match self.local.read(&local_cart_key(user_id)) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "local cart snapshot unreadable, treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orderdesk_core::{CurrencyCode, Packaging, Price, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::local::{MemoryCartStorage, StorageError};
    use crate::remote::MemoryRemoteCart;

    fn line(id: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            name: format!("Item {id}"),
            sku: None,
            unit_price: Price::new(Decimal::ONE, CurrencyCode::EUR),
            packaging: Packaging::unrestricted(),
            quantity,
        }
    }

    fn reconciler(
        local: MemoryCartStorage,
        remote: MemoryRemoteCart,
    ) -> SyncReconciler<MemoryCartStorage, MemoryRemoteCart> {
        SyncReconciler::new(Arc::new(local), Arc::new(remote))
    }

    struct BrokenStorage;

    impl LocalCartStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<Vec<CartLineItem>>, StorageError> {
            Err(StorageError::Poisoned)
        }
        fn write(&self, _key: &str, _items: &[CartLineItem]) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_select_empty_remote_promotes_local() {
        let (items, source) = select_snapshot(vec![line(1, 2)], Vec::new());
        assert_eq!(items, vec![line(1, 2)]);
        assert_eq!(source, SnapshotSource::LocalPromoted);
    }

    #[test]
    fn test_select_non_empty_remote_wins_without_merge() {
        let (items, source) = select_snapshot(vec![line(1, 2)], vec![line(5, 1)]);
        assert_eq!(items, vec![line(5, 1)]);
        assert_eq!(source, SnapshotSource::Remote);
    }

    #[test]
    fn test_select_both_empty() {
        let (items, source) = select_snapshot(Vec::new(), Vec::new());
        assert!(items.is_empty());
        assert_eq!(source, SnapshotSource::Empty);
    }

    #[tokio::test]
    async fn test_reconcile_remote_wins() {
        let user = UserId::new(1);
        let local = MemoryCartStorage::new();
        local.write(&local_cart_key(user), &[line(1, 2)]).unwrap();
        let remote = MemoryRemoteCart::new().with_cart(user, vec![line(5, 1)]);

        let result = reconciler(local, remote).reconcile(user).await;
        assert_eq!(result.items, vec![line(5, 1)]);
        assert_eq!(result.source, SnapshotSource::Remote);
        assert_eq!(result.mode, SyncMode::Synced);
    }

    #[tokio::test]
    async fn test_reconcile_reads_only_own_user() {
        let local = MemoryCartStorage::new();
        local
            .write(&local_cart_key(UserId::new(2)), &[line(1, 2)])
            .unwrap();

        let result = reconciler(local, MemoryRemoteCart::new())
            .reconcile(UserId::new(1))
            .await;
        assert_eq!(result.source, SnapshotSource::Empty);
    }

    #[tokio::test]
    async fn test_reconcile_fetch_failure_falls_back_to_local() {
        let user = UserId::new(1);
        let local = MemoryCartStorage::new();
        local.write(&local_cart_key(user), &[line(1, 2)]).unwrap();
        let remote = MemoryRemoteCart::new().with_cart(user, vec![line(5, 1)]);
        remote.set_fail_fetch(true);

        let result = reconciler(local, remote).reconcile(user).await;
        assert_eq!(result.items, vec![line(1, 2)]);
        assert_eq!(result.source, SnapshotSource::LocalFallback);
        assert_eq!(result.mode, SyncMode::LocalOnly);
    }

    #[tokio::test]
    async fn test_reconcile_unreadable_local_counts_as_empty() {
        let user = UserId::new(1);
        let reconciler =
            SyncReconciler::new(Arc::new(BrokenStorage), Arc::new(MemoryRemoteCart::new()));

        let result = reconciler.reconcile(user).await;
        assert_eq!(result.source, SnapshotSource::Empty);
        assert_eq!(result.mode, SyncMode::Synced);
    }
}
