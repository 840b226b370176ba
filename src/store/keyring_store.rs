use super::{KeyValueStore, StoreError, StoreOp};
use async_trait::async_trait;
use std::sync::Arc;

const PROBE_KEY: &str = "__camwatch_probe";

/// Durable backing in the OS keychain / secret service, one entry per key.
#[derive(Clone)]
pub struct KeyringStore {
    service: Arc<str>,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: Arc::from(service.into()),
        }
    }

    fn entry(service: &str, key: &str) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(service, key)
    }

    pub async fn is_available(&self) -> bool {
        self.run(StoreOp::Probe, PROBE_KEY, |entry| {
            Ok(probe_reachable(entry.get_password()))
        })
        .await
        .unwrap_or(false)
    }

    /// Keychain calls block, so each one runs on the blocking pool.
    async fn run<T, F>(&self, op: StoreOp, key: &str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(keyring::Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();
        let owned_key = key.to_string();
        let joined = tokio::task::spawn_blocking(move || {
            let entry = Self::entry(&service, &owned_key)?;
            f(entry)
        })
        .await;

        match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(StoreError::new(op, key, err)),
            Err(join_err) => Err(StoreError::new(op, key, join_err)),
        }
    }
}

/// Any answer from the keychain, including "no such entry", means it is reachable.
fn probe_reachable(result: Result<String, keyring::Error>) -> bool {
    use keyring::Error::{Ambiguous, BadEncoding, NoEntry};
    matches!(result, Ok(_) | Err(NoEntry | BadEncoding(_) | Ambiguous(_)))
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.to_string();
        self.run(StoreOp::Set, key, move |entry| entry.set_password(&value))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.run(StoreOp::Get, key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err),
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.run(StoreOp::Delete, key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err),
        })
        .await
    }
}
