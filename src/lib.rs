//! Precache - versioned offline resource cache
//!
//! Installs a fixed set of resources into a versioned store so they stay
//! available offline, retires superseded stores on activation, and routes
//! requests between the current store and the live network. Stale versions
//! are never served once a newer one is active.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod store;

pub use config::{InstallPolicy, WorkerConfig, STORE_PREFIX};
pub use error::{PrecacheError, PrecacheResult};
pub use lifecycle::{InstallReport, OfflineWorker, WorkerPhase};
