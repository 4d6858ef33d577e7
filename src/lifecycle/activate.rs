//! Version activation: retire every owned store except the current one
//!
//! The new store already exists by the time this runs (the installer built
//! it), so promotion never leaves a window with no store at all.

use crate::error::PrecacheResult;
use crate::store::StoreRegistry;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

/// Delete every store with `owned_prefix` except `current_store_name`
///
/// Names without the prefix belong to other subsystems and are left alone.
/// Deleting an already-absent store is a no-op; any other deletion failure
/// is logged and does not stop the remaining cleanup. Returns the number of
/// stores actually removed.
pub async fn activate(
    current_store_name: &str,
    owned_prefix: &str,
    registry: &dyn StoreRegistry,
) -> PrecacheResult<usize> {
    let names = registry.list_names().await?;
    let stale: Vec<String> = names
        .into_iter()
        .filter(|name| name.starts_with(owned_prefix) && name != current_store_name)
        .collect();

    let outcomes = join_all(stale.iter().map(|name| async move {
        match registry.delete(name).await {
            Ok(true) => {
                debug!(store = %name, "deleted stale store");
                true
            }
            // Already gone; someone else cleaned it up first
            Ok(false) => false,
            Err(e) => {
                warn!(store = %name, "failed to delete stale store: {}", e);
                false
            }
        }
    }))
    .await;

    let removed = outcomes.into_iter().filter(|deleted| *deleted).count();
    info!(current = %current_store_name, removed, "activation complete");
    Ok(removed)
}
