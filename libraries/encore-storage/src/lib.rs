//! Encore Storage
//!
//! Key-value persistence for session state that must outlive the process
//! (listening history, today).
//!
//! # Backends
//!
//! - [`FileStore`]: one JSON document per key inside a directory
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions
//!
//! Both implement [`KeyValueStore`], which is all the playback crate sees.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_storage::{FileStore, KeyValueStore};
//!
//! # async fn example() -> encore_storage::Result<()> {
//! let store = FileStore::open("./data").await?;
//! store.set("played", "[]".to_string()).await?;
//! assert_eq!(store.get("played").await?.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod file;
mod memory;

pub use error::{Result, StorageError};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// String-keyed document store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw document stored under `key`
    ///
    /// Returns `Ok(None)` when nothing was ever stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete the document stored under `key` (no-op if absent)
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}

/// Serialize `value` as JSON and store it under `key`
pub async fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + Sync,
{
    let document = serde_json::to_string(value)?;
    store.set(key, document).await
}

/// Load and deserialize the JSON document under `key`
///
/// `Ok(None)` if the key is absent. A document that does not parse as `T`
/// is reported as `StorageError::Serialization`.
pub async fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(document) => Ok(Some(serde_json::from_str(&document)?)),
        None => Ok(None),
    }
}

/// Whether `key` is accepted by every backend
///
/// Keys become file names in [`FileStore`], so they are restricted to
/// ASCII alphanumerics, `-` and `_`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validate a storage key, see [`is_valid_key`]
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
