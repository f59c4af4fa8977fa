//! Typed, namespaced view over a [`KVStore`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::{KVError, KVResult, KVStore};

/// Remembered values for one page or command, stored as JSON under
/// `"<page>/<key>"`.
///
/// Several pages can share one store without seeing each other's keys.
#[derive(Clone)]
pub struct PageCache {
    store: Arc<dyn KVStore>,
    page: String,
}

impl PageCache {
    pub fn new(store: Arc<dyn KVStore>, page: impl Into<String>) -> Self {
        Self {
            store,
            page: page.into(),
        }
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    fn prefix(&self) -> String {
        format!("{}/", self.page)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}/{}", self.page, key)
    }

    /// Reads and decodes a value.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> KVResult<Option<T>> {
        match self.store.get(&self.full_key(key))? {
            Some(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| KVError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Like [`PageCache::get`] but falls back to `default` on a missing key
    /// or any read error. Errors are logged, not returned.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                warn!(page = %self.page, key, error = %e, "cached value unreadable");
                default
            }
        }
    }

    /// Encodes and stores a value. Durable on return.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KVResult<()> {
        let raw = serde_json::to_vec(value).map_err(|e| KVError::Serialization(e.to_string()))?;
        self.store.set(&self.full_key(key), &raw)
    }

    pub fn remove(&self, key: &str) -> KVResult<()> {
        self.store.delete(&self.full_key(key))
    }

    /// All values of this page, keyed without the page prefix.
    pub fn entries(&self) -> KVResult<Vec<(String, serde_json::Value)>> {
        let prefix = self.prefix();
        self.store
            .scan(&prefix)?
            .into_iter()
            .map(|(k, raw)| {
                let value = serde_json::from_slice(&raw)
                    .map_err(|e| KVError::Serialization(e.to_string()))?;
                Ok((k[prefix.len()..].to_string(), value))
            })
            .collect()
    }

    /// Removes every value of this page and returns how many there were.
    pub fn clear(&self) -> KVResult<usize> {
        let keys = self.store.scan(&self.prefix())?;
        for (k, _) in &keys {
            self.store.delete(k)?;
        }
        Ok(keys.len())
    }
}
