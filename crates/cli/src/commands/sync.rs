//! Bulk and single-product sync commands.

use std::sync::Arc;

use kiyoh_sync::KiyohClient;
use kiyoh_sync::config::ScopedConfig;
use kiyoh_sync::eligibility::is_eligible;
use kiyoh_sync::sync::{ProductSyncService, SingleSync, SyncProgress};
use kiyoh_sync_core::{BatchProgress, StoreScope};

use crate::catalog_file;
use crate::env_config::EnvConfig;

/// Prints one line per completed batch.
struct ConsoleProgress;

impl SyncProgress for ConsoleProgress {
    fn on_batch_complete(
        &mut self,
        progress: &BatchProgress,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!(
            "Batch {}/{}: {} synced, {} failed ({}/{} total)",
            progress.current_batch,
            progress.total_batches,
            progress.batch_success,
            progress.batch_failed,
            progress.synced + progress.failed,
            progress.total
        );
        Ok(())
    }
}

/// Run the full catalog sync.
///
/// # Errors
///
/// Returns an error when the catalog file is unusable or the run reports
/// failure, so the process exits non-zero.
pub async fn bulk(
    scope: u32,
    catalog_path: &str,
    batch_size: usize,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = StoreScope::new(scope);
    let config = Arc::new(EnvConfig::new());

    if dry_run {
        println!("DRY RUN MODE - No actual sync will be performed");
        let products = catalog_file::load_products(catalog_path)?;
        let scoped = ScopedConfig::new(config.as_ref(), scope);
        let eligible: Vec<_> = products
            .iter()
            .filter(|p| scope.as_u32() == 0 || p.scope == scope)
            .filter(|p| is_eligible(p, &scoped))
            .collect();
        println!(
            "Would sync {} of {} products for scope {scope}",
            eligible.len(),
            products.len()
        );
        for product in eligible {
            println!("- {} ({})", product.sku, product.name);
        }
        return Ok(());
    }

    println!("Syncing products for scope {scope}");
    let catalog = Arc::new(catalog_file::load(catalog_path)?);
    let client = KiyohClient::new(config.clone());
    let service =
        ProductSyncService::new(config, catalog, client).with_batch_size(batch_size.max(1));

    let mut progress = ConsoleProgress;
    let report = service.sync_all_products(scope, Some(&mut progress)).await;

    if report.success {
        println!(
            "Sync completed successfully: {} products synced, {} failed",
            report.synced, report.failed
        );
        if !report.errors.is_empty() {
            println!("Errors encountered:");
            for error in &report.errors {
                println!("- {error}");
            }
        }
        Ok(())
    } else {
        Err(format!("Sync failed: {}", report.message).into())
    }
}

/// Sync one product from the catalog file.
///
/// # Errors
///
/// Returns an error when the SKU is absent from the catalog file or the sync
/// did not end in an upsert.
pub async fn single(
    sku: &str,
    scope: u32,
    catalog_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = StoreScope::new(scope);
    let products = catalog_file::load_products(catalog_path)?;
    let product = products
        .iter()
        .find(|p| p.sku == sku)
        .ok_or_else(|| format!("SKU {sku} not found in {catalog_path}"))?;

    let config = Arc::new(EnvConfig::new());
    let client = KiyohClient::new(config.clone());
    let catalog = Arc::new(catalog_file::load(catalog_path)?);
    let service = ProductSyncService::new(config, catalog, client);

    match service.sync_product(product, scope).await {
        SingleSync::Synced => {
            println!("Product {sku} synced successfully");
            Ok(())
        }
        SingleSync::Disabled => Err("Product sync is disabled for this scope".into()),
        SingleSync::Excluded => Err(format!("Product {sku} is excluded from sync").into()),
        SingleSync::Invalid(invalid) => Err(invalid.to_string().into()),
        SingleSync::Failed(failure) => {
            Err(format!("Sync failed ({}): {failure}", failure.code()).into())
        }
    }
}
