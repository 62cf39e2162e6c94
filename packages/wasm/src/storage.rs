//! `window.localStorage` as a [`KeyValueStore`].

use std::sync::Arc;

use advocacy_commons_session::{KeyValueStore, KvError, MemoryKeyValueStore};
use wasm_bindgen::JsValue;

/// A handle to the page's `localStorage`.
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    /// `window.localStorage`, if the host has one and allows access.
    pub fn local() -> Result<Self, KvError> {
        let window = web_sys::window().ok_or_else(|| KvError::Unavailable("no window".into()))?;
        let inner = window
            .local_storage()
            .map_err(|e| KvError::Unavailable(describe(&e)))?
            .ok_or_else(|| KvError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { inner })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get_item(key).map_err(|e| KvError::Io(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set_item(key, value).map_err(|e| KvError::Io(describe(&e)))
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.inner.remove_item(key).map_err(|e| KvError::Io(describe(&e)))
    }
}

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

thread_local! {
    static FALLBACK: Arc<MemoryKeyValueStore> = Arc::new(MemoryKeyValueStore::new());
}

/// Browser storage when available, otherwise a page-lifetime memory store.
///
/// The fallback keeps limits working for the rest of the page view in
/// private browsing modes and non-browser hosts.
pub(crate) enum LocalStore {
    Browser(BrowserStorage),
    Memory(Arc<MemoryKeyValueStore>),
}

impl LocalStore {
    pub(crate) fn detect() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            if let Ok(storage) = BrowserStorage::local() {
                return LocalStore::Browser(storage);
            }
        }
        LocalStore::Memory(FALLBACK.with(Arc::clone))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            LocalStore::Browser(s) => s.get(key),
            LocalStore::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        match self {
            LocalStore::Browser(s) => s.set(key, value),
            LocalStore::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        match self {
            LocalStore::Browser(s) => s.remove(key),
            LocalStore::Memory(s) => s.remove(key),
        }
    }
}
