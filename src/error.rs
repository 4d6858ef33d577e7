//! Error types for precache
//!
//! All modules use `PrecacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for precache operations
pub type PrecacheResult<T> = Result<T, PrecacheError>;

/// All errors that can occur in precache
#[derive(Error, Debug)]
pub enum PrecacheError {
    // Configuration errors
    #[error("Resource list is empty; at least one resource must be listed")]
    EmptyResourceList,

    #[error("Invalid base URL '{url}': {reason}")]
    BaseUrlInvalid { url: String, reason: String },

    #[error("Resource path '{path}' does not resolve against '{base}': {reason}")]
    ResourceUrlInvalid {
        path: String,
        base: String,
        reason: String,
    },

    // Manifest errors
    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Store errors
    //
    // `StoreRegistry`/`StoreHandle` implementors report their failures
    // through these; the bundled in-memory backend is infallible, so only
    // the open/delete variants are raised in-crate.
    #[error("Failed to open store {name}: {reason}")]
    StoreOpen { name: String, reason: String },

    #[error("Failed to delete store {name}: {reason}")]
    StoreDelete { name: String, reason: String },

    /// For `StoreRegistry::list_names` implementors
    #[error("Failed to list store names: {0}")]
    StoreList(String),

    /// For `StoreHandle::put` implementors
    #[error("Failed to write entry {url} into store {store}: {reason}")]
    StorePut {
        store: String,
        url: String,
        reason: String,
    },

    // Network errors
    #[error("Network fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    // Lifecycle errors
    #[error("Install incomplete: {failed} of {total} resources could not be cached")]
    InstallIncomplete { failed: usize, total: usize },
}

impl PrecacheError {
    /// Create a store open error
    pub fn store_open(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreOpen {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a store delete error
    pub fn store_delete(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreDelete {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a network fetch error
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Transient failures the host may retry with its own backoff policy;
    /// this crate never retries internally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::StoreOpen { .. } | Self::InstallIncomplete { .. }
        )
    }
}
