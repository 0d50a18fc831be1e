//! Orderdesk Cart - keeps a buyer's cart consistent across devices.
//!
//! This crate wires the pure [`orderdesk_core::CartStore`] to its two
//! backing stores:
//!
//! - a device-local snapshot ([`local::LocalCartStorage`]), written on every
//!   mutation;
//! - a per-user remote cart ([`remote::RemoteCartStore`]), written after a
//!   quiet period by the [`scheduler::PersistenceScheduler`].
//!
//! When the signed-in user changes, [`session::CartSession`] asks the
//! [`reconcile::SyncReconciler`] which snapshot is authoritative and loads it.
//!
//! # Example
//!
//! ```rust,ignore
//! use orderdesk_cart::{CartSession, FileCartStorage, HttpRemoteCart};
//!
//! let local = FileCartStorage::new(&config.local_dir)?;
//! let remote = HttpRemoteCart::new(&config.remote)?;
//! let mut session = CartSession::new(local, remote, config.persist_debounce);
//!
//! session.switch_user(Some(user_id)).await;
//! session.add_product(&product, None);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod local;
pub mod reconcile;
pub mod remote;
pub mod scheduler;
pub mod session;
pub mod telemetry;

pub use config::CartConfig;
pub use error::{CartError, Result};
pub use local::{FileCartStorage, LocalCartStorage, MemoryCartStorage, StorageError, local_cart_key};
pub use reconcile::{Reconciliation, SnapshotSource, SyncMode, SyncReconciler, select_snapshot};
pub use remote::{HttpRemoteCart, MemoryRemoteCart, RemoteCartError, RemoteCartStore};
pub use scheduler::PersistenceScheduler;
pub use session::CartSession;
