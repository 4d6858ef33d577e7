//! Cache lifecycle: install, activate, route
//!
//! One `OfflineWorker` drives one deployed version through its phases:
//!
//! ```text
//! Uninstalled -> Installing -> InstalledInactive -> Activating -> Active
//! ```
//!
//! Install failure returns the worker to `Uninstalled`, so a broken version
//! never becomes current. Requests can be served in any phase; before the
//! install completes they simply miss and fall through to the network. The
//! host is responsible for triggering install before activate; this crate
//! does not serialize across versions.

pub mod activate;
pub mod install;
pub mod route;

pub use activate::activate;
pub use install::{install, InstallReport};
pub use route::Router;

use crate::config::WorkerConfig;
use crate::error::PrecacheResult;
use crate::http::{Request, Response};
use crate::net::Network;
use crate::store::StoreRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Lifecycle phase of one worker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerPhase {
    Uninstalled,
    Installing,
    /// Store populated, superseded versions not yet retired
    InstalledInactive,
    Activating,
    Active,
}

impl WorkerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::InstalledInactive => "installed-inactive",
            Self::Activating => "activating",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives the lifecycle of one deployed version against host capabilities
pub struct OfflineWorker {
    config: WorkerConfig,
    registry: Arc<dyn StoreRegistry>,
    network: Arc<dyn Network>,
    phase: Mutex<WorkerPhase>,
    router: Router,
}

impl OfflineWorker {
    pub fn new(
        config: WorkerConfig,
        registry: Arc<dyn StoreRegistry>,
        network: Arc<dyn Network>,
    ) -> Self {
        let router = Router::new(
            config.store_name(),
            Arc::clone(&registry),
            Arc::clone(&network),
        );
        Self {
            config,
            registry,
            network,
            phase: Mutex::new(WorkerPhase::Uninstalled),
            router,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> WorkerPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, next: WorkerPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        debug!(from = %*phase, to = %next, "phase transition");
        *phase = next;
    }

    /// Run the install phase for this version
    ///
    /// The returned future resolves only once every per-resource outcome has
    /// settled; the host must not consider the install event finished before
    /// then. On failure the worker returns to `Uninstalled` and the version
    /// never becomes current.
    pub async fn install(&self) -> PrecacheResult<InstallReport> {
        self.set_phase(WorkerPhase::Installing);
        match install::install(&self.config, self.registry.as_ref(), self.network.as_ref()).await {
            Ok(report) => {
                self.set_phase(WorkerPhase::InstalledInactive);
                Ok(report)
            }
            Err(e) => {
                self.set_phase(WorkerPhase::Uninstalled);
                Err(e)
            }
        }
    }

    /// Run the activate phase: retire every owned store except this
    /// version's
    ///
    /// Resolves once all deletions have settled; returns the number of
    /// stores removed.
    pub async fn activate(&self) -> PrecacheResult<usize> {
        self.set_phase(WorkerPhase::Activating);
        let removed = activate::activate(
            &self.config.store_name(),
            &self.config.owned_prefix(),
            self.registry.as_ref(),
        )
        .await?;
        self.set_phase(WorkerPhase::Active);
        Ok(removed)
    }

    /// Serve one inbound request
    ///
    /// Works in any phase; requests made before install completes miss and
    /// fall through to the network.
    pub async fn serve(&self, request: &Request) -> PrecacheResult<Response> {
        self.router.serve(request).await
    }
}
