//! Worker configuration
//!
//! The explicit context struct handed to every lifecycle component:
//! prefix, scope, version, resource list, base URL. Nothing is read from
//! ambient state; one `WorkerConfig` describes one deployed version.

use crate::error::{PrecacheError, PrecacheResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use url::Url;

/// Namespace prefix for every store owned by this crate
///
/// Store names in the host registry that do not start with this prefix
/// belong to other subsystems and are never touched.
pub const STORE_PREFIX: &str = "offline-cache:";

/// Aggregate success policy for a version install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallPolicy {
    /// Per-resource failures are logged and the install still succeeds,
    /// leaving a partially populated store.
    #[default]
    BestEffort,
    /// Any per-resource failure fails the install; the version never
    /// becomes current.
    RequireAll,
}

/// Build-generated manifest: the version identifier plus the resource list
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: String,
    base_url: String,
    resources: Vec<String>,
}

/// Configuration for one deployed version of the resource set
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Disambiguates independent deployments sharing one host
    pub scope: String,

    /// Opaque version identifier, unique per resource set
    pub version: String,

    /// Relative resource paths to precache
    ///
    /// Private so the non-empty invariant checked by [`WorkerConfig::new`]
    /// cannot be bypassed.
    resources: Vec<String>,

    /// Base URL the resource paths resolve against
    pub base_url: Url,

    /// Aggregate install success policy
    pub policy: InstallPolicy,
}

impl WorkerConfig {
    /// Create a configuration, validating the resource list
    ///
    /// This is the only place the non-empty invariant is enforced; every
    /// configuration the lifecycle sees has at least one resource.
    pub fn new(
        scope: impl Into<String>,
        version: impl Into<String>,
        resources: Vec<String>,
        base_url: Url,
    ) -> PrecacheResult<Self> {
        if resources.is_empty() {
            return Err(PrecacheError::EmptyResourceList);
        }
        Ok(Self {
            scope: scope.into(),
            version: version.into(),
            resources,
            base_url,
            policy: InstallPolicy::default(),
        })
    }

    /// Set the install policy
    pub fn with_policy(mut self, policy: InstallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Relative resource paths to precache; never empty
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Prefix shared by every store this deployment owns, across versions
    pub fn owned_prefix(&self) -> String {
        format!("{}{}:", STORE_PREFIX, self.scope)
    }

    /// Store name for this version: prefix + scope + version
    ///
    /// Globally unique per (prefix, scope, version); two versions never
    /// collide.
    pub fn store_name(&self) -> String {
        format!("{}{}", self.owned_prefix(), self.version)
    }

    /// Load version, base URL and resource list from a build-generated
    /// JSON manifest
    pub async fn from_manifest_file(
        path: &Path,
        scope: impl Into<String>,
    ) -> PrecacheResult<Self> {
        if !path.exists() {
            return Err(PrecacheError::ManifestNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PrecacheError::ManifestRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| PrecacheError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let base_url = Url::parse(&manifest.base_url).map_err(|e| PrecacheError::BaseUrlInvalid {
            url: manifest.base_url.clone(),
            reason: e.to_string(),
        })?;

        Self::new(scope, manifest.version, manifest.resources, base_url)
    }
}
