/// Key-value storage abstraction over chrome.storage

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// Backup history in the local store
pub const TAB_BACKUPS_KEY: &str = "tabBackups";
/// Backup history in the remote ("cloud") store
pub const BACKUP_DATA_KEY: &str = "backupData";
pub const DOMAIN_STATS_KEY: &str = "domainStats";
pub const USAGE_STATS_KEY: &str = "usageStats";
pub const SETTINGS_KEY: &str = "settings";

/// String-keyed store of JSON values
///
/// Implemented by `chrome.storage.local`, `chrome.storage.sync` and the
/// in-memory [`MemoryStore`]. Writes replace the whole value under a key.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Load and decode a value, falling back to `T::default()` when the key is unset
pub async fn load<T, S>(store: &S, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore,
{
    match store.get(key).await? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        }),
    }
}

pub async fn save<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// Store kept entirely in memory; never suspends
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}
