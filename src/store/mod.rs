//! Store capability abstraction
//!
//! The host provides opaque keyed storage; the lifecycle only ever consumes
//! it through these traits. One store exists per installed version, mapping
//! canonical requests to captured responses. The registry is shared
//! host-wide, so names without this crate's prefix are foreign and must be
//! left alone.

pub mod memory;

pub use memory::MemoryStores;

use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// A single versioned store: canonical request -> captured response
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// Store a response under the canonical request key, replacing any
    /// previous entry
    async fn put(&self, request: &Request, response: Response) -> PrecacheResult<()>;

    /// Look up a response by canonical request key
    async fn lookup(&self, request: &Request) -> PrecacheResult<Option<Response>>;
}

/// Host-wide registry of named stores
#[async_trait]
pub trait StoreRegistry: Send + Sync {
    /// Open a store by name, creating it if absent
    ///
    /// Opening the same name twice returns handles onto the same contents;
    /// reopening is always safe and idempotent.
    async fn open(&self, name: &str) -> PrecacheResult<Arc<dyn StoreHandle>>;

    /// Delete a store by name
    ///
    /// Returns `false` if no store with that name existed.
    async fn delete(&self, name: &str) -> PrecacheResult<bool>;

    /// Names of all registered stores, owned or foreign
    async fn list_names(&self) -> PrecacheResult<Vec<String>>;
}
