//! Product data and credential validation commands.

use std::sync::Arc;

use kiyoh_sync::KiyohClient;
use kiyoh_sync::config::{ConfigSource, ScopedConfig, paths};
use kiyoh_sync::payload::build_product_payload;
use kiyoh_sync_core::StoreScope;
use secrecy::SecretString;

use crate::catalog_file;
use crate::env_config::EnvConfig;

/// Run the payload builder across the catalog file and report what would be
/// rejected before it ever reaches the platform.
///
/// # Errors
///
/// Returns an error when the catalog file is unusable or any product fails
/// to build.
pub fn products(scope: u32, catalog_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let scope = StoreScope::new(scope);
    let source = EnvConfig::new();
    let config = ScopedConfig::new(&source, scope);
    let location_id = config.location_id().unwrap_or_default();

    let records = catalog_file::load_products(catalog_path)?;
    println!("Validating {} products from {catalog_path}", records.len());

    let mut invalid = 0usize;
    for record in &records {
        match build_product_payload(record, &location_id) {
            Ok(payload) => {
                let mut notes = Vec::new();
                if record.gtin.is_some() && payload.gtins.is_none() {
                    notes.push("GTIN dropped (not 13 digits)");
                }
                if record.url.is_some() && payload.source_url.starts_with("https://example.com/") {
                    notes.push("URL replaced with fallback");
                }
                if notes.is_empty() {
                    println!("OK   {}", record.sku);
                } else {
                    println!("WARN {}: {}", record.sku, notes.join(", "));
                }
            }
            Err(e) => {
                invalid += 1;
                println!("FAIL {}: {e}", record.sku);
            }
        }
    }

    if invalid > 0 {
        Err(format!("{invalid} products cannot be synced").into())
    } else {
        println!("All products can be synced");
        Ok(())
    }
}

/// Validate credentials against the live platform before saving them.
///
/// # Errors
///
/// Returns an error when required arguments are missing or validation fails.
pub async fn credentials(
    server: &str,
    location_id: Option<&str>,
    legacy: bool,
    connector: Option<&str>,
    company_id: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = KiyohClient::new(Arc::new(EnvConfig::new()));

    let outcome = if legacy {
        let connector = connector.ok_or("--connector is required with --legacy")?;
        let company_id = company_id.ok_or("--company-id is required with --legacy")?;
        client
            .validate_legacy_credentials(server, connector, company_id)
            .await
    } else {
        let location_id = location_id.ok_or("--location-id is required")?;
        let token = EnvConfig::new()
            .get(paths::API_TOKEN, StoreScope::new(0))
            .map(SecretString::from)
            .ok_or("KIYOH_API_TOKEN is not set")?;
        client
            .validate_credentials(server, &token, location_id)
            .await
    };

    if outcome.success {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(outcome.message.into())
    }
}
