//! Crate-level error type.
//!
//! Session operations never return these: sync failures are recovered
//! locally and logged. They surface from setup (config, storage, client
//! construction) and from explicit operator commands.

use thiserror::Error;

use crate::config::ConfigError;
use crate::local::StorageError;
use crate::remote::RemoteCartError;

/// Errors raised while setting up or explicitly driving cart sync.
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local snapshot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote cart operation failed.
    #[error("Remote cart error: {0}")]
    Remote(#[from] RemoteCartError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
