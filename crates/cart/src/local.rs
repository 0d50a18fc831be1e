//! Device-local cart snapshots.
//!
//! The local snapshot is the always-on backup: it is rewritten synchronously
//! after every cart mutation, so it is the freshest copy a device has even
//! when the remote write is still pending or has failed.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use orderdesk_core::{CartLineItem, UserId};
use thiserror::Error;

/// Errors from reading or writing a local snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored snapshot is not valid JSON.
    #[error("corrupt cart snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Lock poisoned by a panicking writer.
    #[error("local storage lock poisoned")]
    Poisoned,
}

/// Namespaced storage key for a user's cart.
#[must_use]
pub fn local_cart_key(user_id: UserId) -> String {
    format!("cart:{user_id}")
}

/// Key-value storage for cart snapshots on this device.
pub trait LocalCartStorage: Send + Sync + 'static {
    /// Read a snapshot. `Ok(None)` means nothing is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn read(&self, key: &str) -> Result<Option<Vec<CartLineItem>>, StorageError>;

    /// Overwrite the snapshot under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn write(&self, key: &str, items: &[CartLineItem]) -> Result<(), StorageError>;

    /// Delete the snapshot under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be deleted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileCartStorage
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    /// Storage rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the snapshots.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl LocalCartStorage for FileCartStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<CartLineItem>>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write(&self, key: &str, items: &[CartLineItem]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(items)?;

        let mut file = fs::File::create(&tmp).map_err(io_error(&tmp))?;
        file.write_all(&json).map_err(io_error(&tmp))?;
        file.sync_all().map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}

// =============================================================================
// MemoryCartStorage
// =============================================================================

/// Process-local storage, for tests and for sessions without a disk.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    entries: Mutex<HashMap<String, Vec<CartLineItem>>>,
}

impl MemoryCartStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl LocalCartStorage for MemoryCartStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<CartLineItem>>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, items: &[CartLineItem]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), items.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
