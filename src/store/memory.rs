//! In-memory store backend
//!
//! Reference implementation of the store capability. Contents live for the
//! lifetime of the registry; persistence is the host's concern, not this
//! backend's.

use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use crate::store::{StoreHandle, StoreRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One named store: canonical key -> captured response
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Response>>,
}

impl MemoryStore {
    /// Number of entries currently stored
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl StoreHandle for MemoryStore {
    async fn put(&self, request: &Request, response: Response) -> PrecacheResult<()> {
        self.entries
            .lock()
            .await
            .insert(request.canonical_key(), response);
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> PrecacheResult<Option<Response>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&request.canonical_key())
            .cloned())
    }
}

/// In-memory registry of named stores
#[derive(Default)]
pub struct MemoryStores {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry count for a named store; zero if the store is absent
    pub async fn entry_count(&self, name: &str) -> usize {
        let store = self.stores.lock().await.get(name).cloned();
        match store {
            Some(store) => store.len().await,
            None => 0,
        }
    }
}

#[async_trait]
impl StoreRegistry for MemoryStores {
    async fn open(&self, name: &str) -> PrecacheResult<Arc<dyn StoreHandle>> {
        let mut stores = self.stores.lock().await;
        let store = stores.entry(name.to_string()).or_default().clone();
        let handle: Arc<dyn StoreHandle> = store;
        Ok(handle)
    }

    async fn delete(&self, name: &str) -> PrecacheResult<bool> {
        Ok(self.stores.lock().await.remove(name).is_some())
    }

    async fn list_names(&self) -> PrecacheResult<Vec<String>> {
        let mut names: Vec<String> = self.stores.lock().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
