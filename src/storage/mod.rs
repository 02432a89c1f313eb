//! Key-value storage capabilities.
//!
//! The crate persists two kinds of state: the credential bundle, which must go
//! through an encrypted-at-rest store provided by the host platform, and
//! non-sensitive caches (profile, account type). Both are modelled by the same
//! [`KeyValueStorage`] trait; the host decides which implementation backs
//! which role.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ClientResult;

mod file;

pub use file::FileStorage;

/// String key-value store.
///
/// Every call is a self-contained acquisition of the underlying storage: an
/// implementation must not hold handles open between calls. Failures are
/// reported as [`ClientError::Storage`](crate::error::ClientError::Storage).
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> ClientResult<()>;
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// Process-local storage, lost on exit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStorage {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

type DynGetFn = dyn Fn(&str) -> ClientResult<Option<String>> + Send + Sync;
type DynSetFn = dyn Fn(&str, String) -> ClientResult<()> + Send + Sync;
type DynRemoveFn = dyn Fn(&str) -> ClientResult<()> + Send + Sync;

/// Adapter over host-provided storage callbacks, typically an encrypted
/// keychain/keystore bridge.
pub struct ClosureStorage {
    get_fn: Arc<DynGetFn>,
    set_fn: Arc<DynSetFn>,
    remove_fn: Arc<DynRemoveFn>,
}

impl ClosureStorage {
    pub fn new<Get, Set, Remove>(get: Get, set: Set, remove: Remove) -> Self
    where
        Get: Fn(&str) -> ClientResult<Option<String>> + Send + Sync + 'static,
        Set: Fn(&str, String) -> ClientResult<()> + Send + Sync + 'static,
        Remove: Fn(&str) -> ClientResult<()> + Send + Sync + 'static,
    {
        Self {
            get_fn: Arc::new(get),
            set_fn: Arc::new(set),
            remove_fn: Arc::new(remove),
        }
    }
}

impl std::fmt::Debug for ClosureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureStorage").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStorage for ClosureStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        (self.get_fn)(key)
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        (self.set_fn)(key, value)
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        (self.remove_fn)(key)
    }
}
