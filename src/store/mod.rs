//! Secure key/value persistence with a platform-selected backing.
//!
//! [`SecureKeyValueStore`] picks its backing exactly once, on first use: the
//! OS keychain when the platform has one, otherwise volatile process memory.
//! Every later call for the life of the store goes to that same backing.
//!
//! Backings are last-writer-wins. The facade additionally serializes writes
//! to the same key with a per-key mutex so a `set` racing a `delete` settles
//! in call order.

mod keyring_store;
mod memory;

pub use keyring_store::KeyringStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Set,
    Get,
    Delete,
    Probe,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Probe => "probe",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("secure store {op} failed for key `{key}`: {reason}")]
pub struct StoreError {
    pub op: StoreOp,
    pub key: String,
    pub reason: String,
}

impl StoreError {
    pub fn new(op: StoreOp, key: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            op,
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Capability interface every backing implements.
///
/// `get` of a missing key is `Ok(None)` and `delete` of a missing key is
/// `Ok(())`; only genuine backing failures surface as [`StoreError`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Which backing the host asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backing {
    /// Keychain when available, memory otherwise.
    #[default]
    Auto,
    Native,
    Memory,
}

impl Backing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "native" => Some(Self::Native),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// The backing actually in use once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackingKind {
    Native,
    Memory,
}

impl BackingKind {
    /// Only the native keychain survives a restart and is encrypted at rest.
    /// On Linux that is the Secret Service, not the session-scoped kernel keyring.
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Native)
    }
}

type Resolved = (BackingKind, Arc<dyn KeyValueStore>);

pub struct SecureKeyValueStore {
    preference: Backing,
    service: String,
    resolved: OnceCell<Resolved>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SecureKeyValueStore {
    pub fn new(preference: Backing, service: impl Into<String>) -> Self {
        Self {
            preference,
            service: service.into(),
            resolved: OnceCell::new(),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// A store whose backing is already chosen by the caller.
    pub fn with_backing(kind: BackingKind, backing: Arc<dyn KeyValueStore>) -> Self {
        let preference = match kind {
            BackingKind::Native => Backing::Native,
            BackingKind::Memory => Backing::Memory,
        };
        Self {
            preference,
            service: String::new(),
            resolved: OnceCell::new_with(Some((kind, backing))),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backing(BackingKind::Memory, Arc::new(MemoryStore::new()))
    }

    /// `None` until the first operation resolves the backing.
    pub fn backing_kind(&self) -> Option<BackingKind> {
        self.resolved.get().map(|(kind, _)| *kind)
    }

    async fn backing(&self) -> &Arc<dyn KeyValueStore> {
        let (_, backing) = self.resolved.get_or_init(|| self.select()).await;
        backing
    }

    async fn select(&self) -> Resolved {
        let native = KeyringStore::new(self.service.clone());
        let kind = match self.preference {
            Backing::Memory => BackingKind::Memory,
            Backing::Native => BackingKind::Native,
            Backing::Auto => {
                if native.is_available().await {
                    BackingKind::Native
                } else {
                    tracing::warn!(
                        service = %self.service,
                        "OS keychain unavailable, falling back to in-memory secure store"
                    );
                    BackingKind::Memory
                }
            }
        };
        tracing::info!(backing = ?kind, "secure store backing selected");

        let backing: Arc<dyn KeyValueStore> = match kind {
            BackingKind::Native => Arc::new(native),
            BackingKind::Memory => Arc::new(MemoryStore::new()),
        };
        (kind, backing)
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }
}

#[async_trait]
impl KeyValueStore for SecureKeyValueStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;
        tracing::debug!(key = %key, "secure store set");
        self.backing().await.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        tracing::debug!(key = %key, "secure store get");
        self.backing().await.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;
        tracing::debug!(key = %key, "secure store delete");
        self.backing().await.delete(key).await
    }
}
