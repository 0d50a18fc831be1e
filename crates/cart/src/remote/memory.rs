//! In-memory remote cart store.
//!
//! Used by tests and by the CLI's offline mode. Failures can be switched on
//! to exercise the fallback paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::time::Instant;

use orderdesk_core::{CartLineItem, UserId};

use super::{RemoteCartError, RemoteCartStore};

/// A successful remote write.
#[derive(Debug, Clone)]
pub struct RemoteWrite {
    pub user_id: UserId,
    pub items: Vec<CartLineItem>,
    /// Tokio clock reading at write time (pausable in tests).
    pub at: Instant,
}

/// Remote cart store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryRemoteCart {
    carts: Mutex<HashMap<UserId, Vec<CartLineItem>>>,
    writes: Mutex<Vec<RemoteWrite>>,
    fetches: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_persist: AtomicBool,
}

impl MemoryRemoteCart {
    /// Empty remote with no carts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's remote cart.
    #[must_use]
    pub fn with_cart(self, user_id: UserId, items: Vec<CartLineItem>) -> Self {
        if let Ok(mut carts) = self.carts.lock() {
            carts.insert(user_id, items);
        }
        self
    }

    /// Make every fetch fail until switched off.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every persist fail until switched off.
    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    /// The stored cart for `user_id`.
    #[must_use]
    pub fn cart(&self, user_id: UserId) -> Option<Vec<CartLineItem>> {
        self.carts.lock().ok()?.get(&user_id).cloned()
    }

    /// Successful writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<RemoteWrite> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    /// Number of fetches attempted.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RemoteCartStore for MemoryRemoteCart {
    async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RemoteCartError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Unavailable("fetch disabled".to_string()));
        }
        Ok(self.cart(user_id).unwrap_or_default())
    }

    async fn persist_cart(
        &self,
        user_id: UserId,
        items: Vec<CartLineItem>,
    ) -> Result<(), RemoteCartError> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Unavailable("persist disabled".to_string()));
        }

        let mut carts = self
            .carts
            .lock()
            .map_err(|_| RemoteCartError::Unavailable("lock poisoned".to_string()))?;
        carts.insert(user_id, items.clone());
        drop(carts);

        if let Ok(mut writes) = self.writes.lock() {
            writes.push(RemoteWrite {
                user_id,
                items,
                at: Instant::now(),
            });
        }
        Ok(())
    }
}
