//! Debounced cart persistence.
//!
//! Every cart mutation rewrites the local snapshot immediately and (re)starts
//! a quiet-period timer; the remote cart is written once the timer expires
//! with no further mutations (trailing-edge debounce). Cancelling, rebinding
//! to another user or dropping the scheduler aborts a pending remote write so
//! a cart is never written under the wrong user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use orderdesk_core::{CartChange, CartLineItem, CartObserver, UserId};

use crate::config::DEFAULT_PERSIST_DEBOUNCE;
use crate::local::{LocalCartStorage, local_cart_key};
use crate::remote::RemoteCartStore;

struct Pending {
    user_id: UserId,
    items: Vec<CartLineItem>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ScheduleState {
    user_id: Option<UserId>,
    pending: Option<Pending>,
}

/// Writes cart snapshots locally at once and remotely after a quiet period.
pub struct PersistenceScheduler<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
    quiet_period: Duration,
    runtime: Handle,
    state: Mutex<ScheduleState>,
}

impl<L: LocalCartStorage, R: RemoteCartStore> PersistenceScheduler<L, R> {
    /// Create a scheduler that runs its timers on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(local: Arc<L>, remote: Arc<R>, quiet_period: Duration) -> Self {
        Self::with_runtime(local, remote, quiet_period, Handle::current())
    }

    /// Create a scheduler that runs its timers on `runtime`.
    #[must_use]
    pub fn with_runtime(
        local: Arc<L>,
        remote: Arc<R>,
        quiet_period: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            local,
            remote,
            quiet_period,
            runtime,
            state: Mutex::new(ScheduleState::default()),
        }
    }

    /// A scheduler with the default 2 s quiet period.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_default_debounce(local: Arc<L>, remote: Arc<R>) -> Self {
        Self::new(local, remote, DEFAULT_PERSIST_DEBOUNCE)
    }

    /// Persist future mutations under `user_id`. Cancels any pending write.
    pub fn bind(&self, user_id: UserId) {
        let mut state = self.lock();
        abort_pending(&mut state);
        state.user_id = Some(user_id);
    }

    /// Stop persisting. Cancels any pending write.
    pub fn unbind(&self) {
        let mut state = self.lock();
        abort_pending(&mut state);
        state.user_id = None;
    }

    /// The user mutations are persisted under.
    #[must_use]
    pub fn bound_user(&self) -> Option<UserId> {
        self.lock().user_id
    }

    /// Cancel the pending remote write, if any.
    pub fn cancel(&self) {
        abort_pending(&mut self.lock());
    }

    /// Returns `true` while a remote write is waiting for its quiet period.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock()
            .pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Write `items` locally now and schedule the remote write.
    ///
    /// Does nothing while no user is bound.
    pub fn schedule(&self, items: &[CartLineItem]) {
        let mut state = self.lock();
        let Some(user_id) = state.user_id else {
            debug!("no user bound, cart change not persisted");
            return;
        };

        self.write_local(user_id, items);
        abort_pending(&mut state);

        let remote = Arc::clone(&self.remote);
        let quiet_period = self.quiet_period;
        let snapshot = items.to_vec();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(quiet_period).await;
            persist_remote(remote.as_ref(), user_id, snapshot).await;
        });

        state.pending = Some(Pending {
            user_id,
            items: items.to_vec(),
            handle,
        });
    }

    /// Write the pending snapshot to the remote now instead of waiting.
    ///
    /// Returns `true` if there was a pending write.
    pub async fn flush(&self) -> bool {
        let pending = {
            let mut state = self.lock();
            state.pending.take()
        };
        let Some(pending) = pending.filter(|p| !p.handle.is_finished()) else {
            return false;
        };

        pending.handle.abort();
        persist_remote(self.remote.as_ref(), pending.user_id, pending.items).await;
        true
    }

    fn write_local(&self, user_id: UserId, items: &[CartLineItem]) {
        if let Err(e) = self.local.write(&local_cart_key(user_id), items) {
            warn!(user_id = %user_id, error = %e, "failed to write local cart snapshot");
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScheduleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn abort_pending(state: &mut ScheduleState) {
    let Some(pending) = state.pending.take() else {
        return;
    };
    if !pending.handle.is_finished() {
        pending.handle.abort();
        debug!(user_id = %pending.user_id, "pending remote cart write cancelled");
    }
}

async fn persist_remote<R: RemoteCartStore>(
    remote: &R,
    user_id: UserId,
    items: Vec<CartLineItem>,
) {
    let count = items.len();
    match remote.persist_cart(user_id, items).await {
        Ok(()) => info!(user_id = %user_id, items = count, "remote cart saved"),
        // Local storage already holds this state.
        Err(e) => warn!(user_id = %user_id, error = %e, "remote cart write failed"),
    }
}

impl<L: LocalCartStorage, R: RemoteCartStore> CartObserver for PersistenceScheduler<L, R> {
    fn cart_changed(&self, change: &CartChange, items: &[CartLineItem]) {
        debug!(?change, items = items.len(), "cart changed");
        self.schedule(items);
    }
}

impl<L, R> Drop for PersistenceScheduler<L, R> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = state.pending.take() {
            pending.handle.abort();
        }
    }
}
