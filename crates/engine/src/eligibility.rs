//! Per-product sync exclusion rules.

use kiyoh_sync_core::ProductRecord;
use tracing::debug;

use crate::config::ScopedConfig;

/// Whether a product qualifies for catalog sync under the scope's settings.
///
/// A product needs a SKU and a name, must not carry an excluded type tag, and
/// must not be on the excluded-SKU list. The exclusion lists are re-read from
/// configuration on every call; nothing is cached across products.
#[must_use]
pub fn is_eligible(product: &ProductRecord, config: &ScopedConfig<'_>) -> bool {
    if product.sku.trim().is_empty() || product.name.trim().is_empty() {
        return false;
    }

    if config.excluded_product_types().contains(&product.type_id) {
        debug!(sku = %product.sku, type_id = %product.type_id, "product excluded by type");
        return false;
    }

    if config.excluded_product_codes().contains(&product.sku) {
        debug!(sku = %product.sku, "product excluded by SKU");
        return false;
    }

    true
}
