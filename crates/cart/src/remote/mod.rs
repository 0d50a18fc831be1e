//! Per-user remote cart store.
//!
//! The remote cart is an opaque key-value resource keyed by user. There is no
//! versioning or conflict detection: the last write wins.

mod http;
mod memory;

pub use http::HttpRemoteCart;
pub use memory::{MemoryRemoteCart, RemoteWrite};

use std::future::Future;

use orderdesk_core::{CartLineItem, UserId};
use thiserror::Error;

/// Errors that can occur when talking to the remote cart store.
#[derive(Debug, Error)]
pub enum RemoteCartError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote returned a non-success status.
    #[error("remote cart returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL cannot carry path segments.
    #[error("invalid remote cart URL: {0}")]
    InvalidUrl(String),

    /// Remote is unreachable.
    #[error("remote cart unavailable: {0}")]
    Unavailable(String),
}

/// Remote cart collaborator.
///
/// `fetch_cart` returns an empty list when the user has no cart yet; every
/// other failure is an error the caller recovers from.
pub trait RemoteCartStore: Send + Sync + 'static {
    /// Fetch the user's remote snapshot.
    fn fetch_cart(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<CartLineItem>, RemoteCartError>> + Send;

    /// Replace the user's remote snapshot.
    fn persist_cart(
        &self,
        user_id: UserId,
        items: Vec<CartLineItem>,
    ) -> impl Future<Output = Result<(), RemoteCartError>> + Send;
}
