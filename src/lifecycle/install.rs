//! Version install: populate a fresh store with every listed resource
//!
//! Each resource is fetched through a busted URL so intermediate caches
//! cannot serve a stale copy, then stored under its original canonical
//! request. Per-resource failures are isolated; the aggregate outcome
//! follows the configured `InstallPolicy`.

use crate::config::{InstallPolicy, WorkerConfig};
use crate::error::{PrecacheError, PrecacheResult};
use crate::http::{self, Request};
use crate::net::Network;
use crate::store::{StoreHandle, StoreRegistry};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Outcome of one version install
#[derive(Debug)]
pub struct InstallReport {
    /// Name of the store that was populated
    pub store_name: String,

    /// Resources cached successfully
    pub installed: Vec<String>,

    /// Resources that could not be cached, with the reason
    pub failed: Vec<(String, String)>,
}

impl InstallReport {
    /// Whether every listed resource was cached
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Populate the store for `config.version` from the network
///
/// Any store already registered under the target name is deleted first, so
/// a re-run rebuilds from scratch rather than merging with entries from a
/// half-finished prior attempt. All resources are fetched concurrently; the
/// returned future resolves only once every per-resource outcome has
/// settled.
pub async fn install(
    config: &WorkerConfig,
    registry: &dyn StoreRegistry,
    network: &dyn Network,
) -> PrecacheResult<InstallReport> {
    let store_name = config.store_name();

    // Clean rebuild: a previous partial population must not leak through
    registry.delete(&store_name).await?;
    let store = registry.open(&store_name).await?;

    debug!(
        store = %store_name,
        resources = config.resources().len(),
        "installing version {}",
        config.version
    );

    let outcomes = join_all(config.resources().iter().map(|resource| {
        let store = Arc::clone(&store);
        async move {
            let outcome = cache_resource(config, store.as_ref(), network, resource).await;
            if let Err(e) = &outcome {
                error!(resource = %resource, "failed to cache: {}", e);
            }
            (resource.clone(), outcome)
        }
    }))
    .await;

    let mut report = InstallReport {
        store_name,
        installed: vec![],
        failed: vec![],
    };
    for (resource, outcome) in outcomes {
        match outcome {
            Ok(()) => report.installed.push(resource),
            Err(e) => report.failed.push((resource, e.to_string())),
        }
    }

    if config.policy == InstallPolicy::RequireAll && !report.is_complete() {
        return Err(PrecacheError::InstallIncomplete {
            failed: report.failed.len(),
            total: config.resources().len(),
        });
    }

    info!(
        store = %report.store_name,
        installed = report.installed.len(),
        failed = report.failed.len(),
        "version {} installed",
        config.version
    );
    Ok(report)
}

/// Fetch one resource through its busted URL and store it under the
/// original canonical request
async fn cache_resource(
    config: &WorkerConfig,
    store: &dyn StoreHandle,
    network: &dyn Network,
    resource: &str,
) -> PrecacheResult<()> {
    let url = http::resolve(&config.base_url, resource)?;

    let busted = Request::get(http::bust(&url));
    let original = Request::get(url.clone());

    let response = network.fetch(&busted).await?;
    if !response.ok() {
        return Err(PrecacheError::fetch(
            url.as_str(),
            format!("status {}", response.status),
        ));
    }

    store.put(&original, response).await
}
