//! Batched full-catalog synchronization.
//!
//! [`ProductSyncService`] pages the catalog in fixed-size batches, re-checks
//! eligibility per product, and submits each batch through the client's bulk
//! upsert, with a fixed pause between batches as a rate limit against the
//! upstream API. Failure is batch-local: a bad page, a bad product, or a
//! rejected batch is recorded and the run continues. Only a setup-level
//! failure before batching begins aborts the run.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kiyoh_sync_core::{BatchProgress, ProductRecord, StoreScope, SyncReport};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{CatalogQuery, ProductCatalog};
use crate::client::{ApiFailure, KiyohClient};
use crate::config::{ConfigSource, ScopedConfig};
use crate::eligibility::is_eligible;
use crate::payload::{InvalidProduct, build_product_payload};

/// Products submitted per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Pause before every batch after the first. A deliberate rate limit, not a
/// backoff: it fires regardless of the previous batch's outcome.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(3);

/// Observer notified after every non-empty batch.
///
/// Observer failures are logged and swallowed; they never abort the run.
pub trait SyncProgress {
    /// Called with cumulative and batch-local counts.
    ///
    /// # Errors
    ///
    /// May fail freely; the orchestrator logs and continues.
    fn on_batch_complete(
        &mut self,
        progress: &BatchProgress,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Outcome of a single-product sync.
#[derive(Debug)]
pub enum SingleSync {
    /// Accepted by the platform.
    Synced,
    /// Product sync is disabled for the scope; nothing sent.
    Disabled,
    /// Product excluded by the scope's eligibility rules; nothing sent.
    Excluded,
    /// Record unusable (no SKU or name); nothing sent.
    Invalid(InvalidProduct),
    /// Submitted and rejected, or never reached the platform.
    Failed(ApiFailure),
}

impl SingleSync {
    /// Whether the product ended up synced.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Catalog-to-platform synchronization service.
#[derive(Clone)]
pub struct ProductSyncService {
    config: Arc<dyn ConfigSource>,
    catalog: Arc<dyn ProductCatalog>,
    client: KiyohClient,
    batch_size: usize,
    batch_delay: Duration,
}

impl std::fmt::Debug for ProductSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductSyncService")
            .field("batch_size", &self.batch_size)
            .field("batch_delay", &self.batch_delay)
            .finish_non_exhaustive()
    }
}

impl ProductSyncService {
    #[must_use]
    pub fn new(
        config: Arc<dyn ConfigSource>,
        catalog: Arc<dyn ProductCatalog>,
        client: KiyohClient,
    ) -> Self {
        Self {
            config,
            catalog,
            client,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Override the batch size (bounded below by 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Override the inter-batch pause. Tests shrink this; production keeps
    /// [`DEFAULT_BATCH_DELAY`].
    #[must_use]
    pub const fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Sync the whole catalog (or one store's subset) to the platform.
    ///
    /// Returns a failure report with zero counts when product sync is
    /// disabled for the scope, a success report with zero counts when the
    /// candidate set is empty, and otherwise aggregates per-batch outcomes.
    /// Calling this twice against an unchanged catalog and a healthy upstream
    /// yields identical counts; the upsert semantics make re-runs safe.
    #[instrument(skip(self, progress), fields(scope = %scope))]
    pub async fn sync_all_products(
        &self,
        scope: StoreScope,
        mut progress: Option<&mut dyn SyncProgress>,
    ) -> SyncReport {
        let config = ScopedConfig::new(self.config.as_ref(), scope);

        if !config.product_sync_enabled() {
            info!("product sync disabled");
            return SyncReport::disabled();
        }

        info!("starting bulk product sync");
        let query = CatalogQuery {
            excluded_types: config.excluded_product_types(),
            excluded_codes: config.excluded_product_codes(),
        };

        let total = match self.catalog.count(scope, &query) {
            Ok(total) => total,
            Err(e) => {
                error!(error = %e, "could not count sync candidates");
                return SyncReport::fatal(e);
            }
        };
        info!(total, "found products to sync");

        if total == 0 {
            return SyncReport::empty();
        }

        let total_batches = total.div_ceil(self.batch_size);
        let mut report = SyncReport {
            success: true,
            message: String::new(),
            synced: 0,
            failed: 0,
            errors: Vec::new(),
            total,
            total_batches,
        };
        let location_id = config.location_id().unwrap_or_default();

        for batch in 1..=total_batches {
            if batch > 1 {
                info!(
                    batch,
                    total_batches,
                    delay_secs = self.batch_delay.as_secs_f64(),
                    "rate limiting before next batch"
                );
                tokio::time::sleep(self.batch_delay).await;
            }

            let products = match self.catalog.page(scope, &query, batch, self.batch_size) {
                Ok(products) => products,
                Err(e) => {
                    error!(batch, error = %e, "batch read failed");
                    report.errors.push(format!("Batch {batch} error: {e}"));
                    continue;
                }
            };

            let mut payloads = Vec::with_capacity(products.len());
            for product in products.iter().filter(|p| is_eligible(p, &config)) {
                match build_product_payload(product, &location_id) {
                    Ok(payload) => payloads.push(payload),
                    Err(invalid) => {
                        warn!(sku = %invalid.sku, batch, "failed to build product payload");
                        report.failed += 1;
                        report
                            .errors
                            .push(format!("Failed to build data for {}", display_sku(&invalid)));
                    }
                }
            }

            if payloads.is_empty() {
                continue;
            }

            let outcome = self.client.sync_products_bulk(&payloads, scope).await;
            report.synced += outcome.success_count;
            report.failed += outcome.failed_count;
            report.errors.extend(outcome.errors.iter().cloned());
            info!(
                batch,
                total_batches,
                batch_success = outcome.success_count,
                batch_failed = outcome.failed_count,
                "batch completed"
            );

            if let Some(observer) = progress.as_mut() {
                let snapshot = BatchProgress {
                    current_batch: batch,
                    total_batches,
                    synced: report.synced,
                    failed: report.failed,
                    total,
                    batch_success: outcome.success_count,
                    batch_failed: outcome.failed_count,
                };
                if let Err(e) = observer.on_batch_complete(&snapshot) {
                    warn!(batch, error = %e, "progress observer failed");
                }
            }
        }

        report.message = format!(
            "Bulk sync completed: {} synced, {} failed",
            report.synced, report.failed
        );
        info!(
            synced = report.synced,
            failed = report.failed,
            "bulk sync completed"
        );
        report
    }

    /// Sync one product, applying the scope's enablement and eligibility
    /// rules first.
    #[instrument(skip(self, product), fields(sku = %product.sku, scope = %scope))]
    pub async fn sync_product(&self, product: &ProductRecord, scope: StoreScope) -> SingleSync {
        let config = ScopedConfig::new(self.config.as_ref(), scope);

        if !config.product_sync_enabled() {
            debug!("product sync disabled for scope");
            return SingleSync::Disabled;
        }

        if !is_eligible(product, &config) {
            debug!("product excluded from sync");
            return SingleSync::Excluded;
        }

        let location_id = config.location_id().unwrap_or_default();
        let payload = match build_product_payload(product, &location_id) {
            Ok(payload) => payload,
            Err(invalid) => {
                warn!(sku = %invalid.sku, "cannot build product payload");
                return SingleSync::Invalid(invalid);
            }
        };

        match self.client.sync_product(&payload, scope).await {
            Ok(()) => SingleSync::Synced,
            Err(failure) => SingleSync::Failed(failure),
        }
    }
}

fn display_sku(invalid: &InvalidProduct) -> &str {
    if invalid.sku.trim().is_empty() {
        "unknown"
    } else {
        &invalid.sku
    }
}

/// Per-scope record of whether the one-time initial sync has run.
///
/// Persistence is the host's concern; [`MemorySyncState`] covers tests and
/// single-process hosts.
pub trait SyncStateStore: Send + Sync {
    fn is_initial_sync_done(&self, scope: StoreScope) -> bool;
    fn mark_initial_sync_done(&self, scope: StoreScope);
}

/// In-memory [`SyncStateStore`].
#[derive(Debug, Default)]
pub struct MemorySyncState {
    done: Mutex<HashSet<u32>>,
}

impl MemorySyncState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncStateStore for MemorySyncState {
    fn is_initial_sync_done(&self, scope: StoreScope) -> bool {
        self.done
            .lock()
            .map(|set| set.contains(&scope.as_u32()))
            .unwrap_or(false)
    }

    fn mark_initial_sync_done(&self, scope: StoreScope) {
        if let Ok(mut set) = self.done.lock() {
            set.insert(scope.as_u32());
        }
    }
}

/// Scheduled job that runs the first full sync once per store scope.
///
/// A scope is marked done only after a successful run, so a failed first
/// attempt is retried on the next tick.
pub struct InitialSyncJob {
    service: ProductSyncService,
    state: Arc<dyn SyncStateStore>,
}

impl InitialSyncJob {
    #[must_use]
    pub fn new(service: ProductSyncService, state: Arc<dyn SyncStateStore>) -> Self {
        Self { service, state }
    }

    /// Check every scope and run the initial sync where it is still owed.
    #[instrument(skip(self, scopes))]
    pub async fn run(&self, scopes: &[StoreScope]) {
        info!("starting initial product sync check");

        if scopes.is_empty() {
            warn!("no store scopes to check");
            return;
        }

        for &scope in scopes {
            let config = ScopedConfig::new(self.service.config.as_ref(), scope);
            if !config.product_sync_enabled() {
                debug!(%scope, "product sync disabled for store");
                continue;
            }
            if self.state.is_initial_sync_done(scope) {
                debug!(%scope, "initial sync already completed for store");
                continue;
            }

            info!(%scope, "running initial sync for store");
            let report = self.service.sync_all_products(scope, None).await;
            info!(
                %scope,
                synced = report.synced,
                failed = report.failed,
                success = report.success,
                "initial sync completed for store"
            );

            if report.success {
                self.state.mark_initial_sync_done(scope);
            } else {
                warn!(
                    %scope,
                    errors = report.errors.len(),
                    "initial sync not marked as done due to errors"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sync_state_round_trip() {
        let state = MemorySyncState::new();
        let scope = StoreScope::new(3);
        assert!(!state.is_initial_sync_done(scope));
        state.mark_initial_sync_done(scope);
        assert!(state.is_initial_sync_done(scope));
        assert!(!state.is_initial_sync_done(StoreScope::new(4)));
    }

    #[test]
    fn test_display_sku_falls_back_to_unknown() {
        let invalid = InvalidProduct {
            sku: "  ".to_string(),
        };
        assert_eq!(display_sku(&invalid), "unknown");
        let invalid = InvalidProduct {
            sku: "SKU-9".to_string(),
        };
        assert_eq!(display_sku(&invalid), "SKU-9");
    }
}
