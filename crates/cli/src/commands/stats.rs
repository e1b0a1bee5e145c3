//! Review statistics command.

use std::sync::Arc;

use kiyoh_sync::KiyohClient;
use kiyoh_sync_core::StoreScope;

use crate::env_config::EnvConfig;

/// Fetch and pretty-print shop or product statistics.
///
/// # Errors
///
/// Returns an error when the request fails or the platform rejects it.
pub async fn show(
    scope: u32,
    product_code: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = StoreScope::new(scope);
    let client = KiyohClient::new(Arc::new(EnvConfig::new()));

    let stats = match product_code {
        Some(code) => {
            println!("Product review statistics for {code}:");
            client.product_statistics(code, scope).await
        }
        None => {
            println!("Shop review statistics:");
            client.shop_statistics(scope).await
        }
    }
    .map_err(|failure| format!("{}: {failure}", failure.code()))?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
