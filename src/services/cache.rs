use tokio::sync::RwLock;

use crate::models::garment::InventoryCode;
use crate::store::{StoreError, WashStore};

/// Explicitly owned cache of the inventory code list.
///
/// Held by the lifecycle controller, which invalidates it on every
/// mutating write. Replaces the module-level mutable list of the original
/// design with an object whose invalidation trigger is visible at the
/// call sites.
#[derive(Default)]
pub struct CodeListCache {
    inner: RwLock<Option<Vec<InventoryCode>>>,
}

impl CodeListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list, loading from the store on a miss.
    pub async fn get_or_load(&self, store: &dyn WashStore) -> Result<Vec<InventoryCode>, StoreError> {
        if let Some(codes) = self.inner.read().await.as_ref() {
            return Ok(codes.clone());
        }

        let codes = store.list_codes().await?;
        *self.inner.write().await = Some(codes.clone());
        Ok(codes)
    }

    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}
