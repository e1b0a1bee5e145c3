//! Catalog event handlers.
//!
//! Thin entry points the host wires to its product save/delete events. The
//! order-save counterpart lives in [`crate::dispatcher`].

use std::sync::Arc;

use kiyoh_sync_core::ProductRecord;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigSource, ScopedConfig};
use crate::sync::{ProductSyncService, SingleSync};

/// Handles product save and delete events.
#[derive(Clone)]
pub struct ProductEvents {
    config: Arc<dyn ConfigSource>,
    sync: ProductSyncService,
}

impl std::fmt::Debug for ProductEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductEvents").finish_non_exhaustive()
    }
}

impl ProductEvents {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigSource>, sync: ProductSyncService) -> Self {
        Self { config, sync }
    }

    /// Upsert a just-saved product, when automatic sync is on for its scope.
    ///
    /// Gated on both the product-sync and auto-sync flags so stores can keep
    /// manual bulk sync without per-save traffic.
    #[instrument(skip(self, product), fields(sku = %product.sku, scope = %product.scope))]
    pub async fn handle_product_saved(&self, product: &ProductRecord) -> SingleSync {
        let config = ScopedConfig::new(self.config.as_ref(), product.scope);

        if !config.product_sync_enabled() || !config.auto_sync_enabled() {
            debug!("automatic product sync disabled");
            return SingleSync::Disabled;
        }

        let outcome = self.sync.sync_product(product, product.scope).await;
        match &outcome {
            SingleSync::Synced => info!("product synced after save"),
            SingleSync::Disabled | SingleSync::Excluded => {
                debug!("product excluded from automatic sync");
            }
            SingleSync::Invalid(invalid) => warn!(sku = %invalid.sku, "saved product has no usable data"),
            SingleSync::Failed(failure) => warn!(code = failure.code(), "product sync failed after save"),
        }
        outcome
    }

    /// Note a deleted product. The platform offers no delete endpoint, so
    /// upstream cleanup stays a manual step.
    #[instrument(skip(self, product), fields(sku = %product.sku, scope = %product.scope))]
    pub fn handle_product_deleted(&self, product: &ProductRecord) {
        let config = ScopedConfig::new(self.config.as_ref(), product.scope);
        if !config.product_sync_enabled() {
            return;
        }
        info!("product deleted from catalog; manual cleanup on the review platform may be required");
    }
}
