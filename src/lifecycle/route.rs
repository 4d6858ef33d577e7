//! Request routing between the current store and the network
//!
//! GET requests are served from the current store when present and fall
//! through to a live fetch on a miss. Everything else passes straight
//! through; mutating requests are never served from cache or deduplicated.

use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use crate::net::Network;
use crate::store::{StoreHandle, StoreRegistry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Routes inbound requests for one worker instance
///
/// The store handle is opened lazily, at most once per router lifetime.
/// That is memoization only; reopening the same name is always safe, so a
/// fresh router for a new version simply opens its own handle.
pub struct Router {
    store_name: String,
    registry: Arc<dyn StoreRegistry>,
    network: Arc<dyn Network>,
    handle: OnceCell<Arc<dyn StoreHandle>>,
}

impl Router {
    pub fn new(
        store_name: String,
        registry: Arc<dyn StoreRegistry>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            store_name,
            registry,
            network,
            handle: OnceCell::new(),
        }
    }

    /// Name of the store this router serves from
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    async fn current_store(&self) -> PrecacheResult<&Arc<dyn StoreHandle>> {
        self.handle
            .get_or_try_init(|| self.registry.open(&self.store_name))
            .await
    }

    /// Serve one inbound request
    ///
    /// A stored response is returned verbatim with no revalidation; the
    /// store is authoritative for its version. A miss triggers exactly one
    /// live fetch and is not written back (only a new install updates the
    /// store). Network failures after a miss surface to the caller; there
    /// is no retry here.
    pub async fn serve(&self, request: &Request) -> PrecacheResult<Response> {
        if !request.method.is_cacheable() {
            debug!(method = %request.method, url = %request.url, "passthrough");
            return self.network.fetch(request).await;
        }

        let store = self.current_store().await?;
        if let Some(response) = store.lookup(request).await? {
            debug!(url = %request.url, "cache hit");
            return Ok(response);
        }

        debug!(url = %request.url, "cache miss");
        self.network.fetch(request).await
    }
}
