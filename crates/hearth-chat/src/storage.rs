//! Secure key-value storage boundary.
//!
//! The platform keystore (iOS Keychain, Android Keystore, a desktop
//! secret service) sits behind [`SecureStorage`]. This crate only assumes
//! get/set/remove by string key with at-rest confidentiality.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// The storage backend was unavailable or rejected the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("secure storage unavailable: {reason}")]
pub struct StorageError {
    /// What the storage backend reported.
    pub reason: String,
}

/// Boundary trait for the platform's secure key-value storage.
///
/// Implementations must provide at-rest confidentiality; values passed
/// here are secrets in their canonical encoded form.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key
    /// succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`SecureStorage`] implementation.
///
/// Backs tests and serves as the composition-root default until a
/// platform keystore adapter is wired in.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SecureStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
