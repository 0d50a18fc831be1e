//! Cart inspection and sync commands.
//!
//! # Environment Variables
//!
//! See `orderdesk_cart::config` (`CART_REMOTE_URL` is required).

use std::sync::Arc;

use orderdesk_cart::{
    CartConfig, CartSession, FileCartStorage, HttpRemoteCart, LocalCartStorage,
    Result, SyncReconciler, local_cart_key,
};
use orderdesk_core::{CartLineItem, UserId};
use tracing::info;

/// Show the cart `user_id` would get on sign-in. Writes nothing.
///
/// # Errors
///
/// Returns an error if configuration is invalid or storage cannot be opened.
pub async fn show(user_id: UserId) -> Result<()> {
    let config = CartConfig::from_env()?;
    let local = Arc::new(FileCartStorage::new(&config.local_dir)?);
    let remote = Arc::new(HttpRemoteCart::new(&config.remote)?);

    let reconciliation = SyncReconciler::new(local, remote).reconcile(user_id).await;
    info!(
        user_id = %user_id,
        source = ?reconciliation.source,
        mode = ?reconciliation.mode,
        "reconciled"
    );
    print_cart(&reconciliation.items);
    Ok(())
}

/// Sign `user_id` in, then push the reconciled cart to the remote at once.
///
/// # Errors
///
/// Returns an error if configuration is invalid or storage cannot be opened.
/// Sync failures themselves are logged, not returned.
pub async fn sync(user_id: UserId) -> Result<()> {
    let config = CartConfig::from_env()?;
    let local = FileCartStorage::new(&config.local_dir)?;
    let remote = HttpRemoteCart::new(&config.remote)?;

    let mut session = CartSession::new(local, remote, config.persist_debounce);
    let source = session.switch_user(Some(user_id)).await;
    let flushed = session.flush().await;

    info!(
        user_id = %user_id,
        source = ?source,
        mode = ?session.mode(),
        uploaded = flushed,
        "cart synced"
    );
    print_cart(session.cart().items());
    Ok(())
}

/// Delete this device's snapshot for `user_id`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be deleted.
pub fn clear_local(user_id: UserId) -> Result<()> {
    let config = CartConfig::from_env()?;
    let local = FileCartStorage::new(&config.local_dir)?;
    local.remove(&local_cart_key(user_id))?;
    info!(user_id = %user_id, "local cart snapshot removed");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(items: &[CartLineItem]) {
    if items.is_empty() {
        println!("(empty cart)");
        return;
    }
    for item in items {
        println!(
            "{:>8}  {:>6} x {:<40} {}",
            item.product_id,
            item.quantity,
            item.name,
            item.line_total().display()
        );
    }
}
