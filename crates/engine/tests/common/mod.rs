//! Shared fixtures for the integration tests.

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use kiyoh_sync::catalog::{CatalogError, CatalogQuery, ProductCatalog};
use kiyoh_sync::config::{MemoryConfig, paths};
use kiyoh_sync_core::{OrderItem, OrderRecord, ProductRecord, StoreScope};
use rust_decimal::Decimal;

pub const SCOPE: StoreScope = StoreScope::new(1);
pub const TOKEN: &str = "test-api-token";
pub const LOCATION: &str = "1054321";

/// Configuration with the integration fully enabled for [`SCOPE`].
pub fn enabled_config() -> MemoryConfig {
    MemoryConfig::new()
        .with(SCOPE, paths::ENABLED, "1")
        .with(SCOPE, paths::INVITATIONS_ENABLED, "1")
        .with(SCOPE, paths::PRODUCT_SYNC_ENABLED, "1")
        .with(SCOPE, paths::API_TOKEN, TOKEN)
        .with(SCOPE, paths::LOCATION_ID, LOCATION)
        .with(SCOPE, paths::ORDER_STATUS_TRIGGER, "complete,shipped")
}

pub fn product(sku: &str) -> ProductRecord {
    let mut p = ProductRecord::new(sku, format!("Product {sku}"));
    p.type_id = "simple".to_string();
    p.url = Some(format!("https://shop.example.com/{sku}"));
    p.image_url = Some(format!("https://shop.example.com/media/{sku}.jpg"));
    p.scope = SCOPE;
    p
}

pub fn products(count: usize) -> Vec<ProductRecord> {
    (1..=count).map(|i| product(&format!("SKU{i:04}"))).collect()
}

pub fn order(items: Vec<OrderItem>) -> OrderRecord {
    OrderRecord {
        id: 42,
        increment_id: Some("100000042".to_string()),
        customer_email: Some("jo@example.com".to_string()),
        customer_firstname: Some("Jo".to_string()),
        customer_lastname: Some("Doe".to_string()),
        customer_group_id: Some("1".to_string()),
        status: "complete".to_string(),
        scope: SCOPE,
        shipping_address: None,
        items,
    }
}

pub fn line_item(sku: &str, price_cents: i64) -> OrderItem {
    OrderItem::new(Some(product(sku)), Decimal::new(price_cents, 2))
}

/// Catalog that ignores the query-level filters, to exercise the
/// orchestrator's own eligibility re-check.
pub struct RawCatalog(pub Vec<ProductRecord>);

impl ProductCatalog for RawCatalog {
    fn count(&self, _scope: StoreScope, _query: &CatalogQuery) -> Result<usize, CatalogError> {
        Ok(self.0.len())
    }

    fn page(
        &self,
        _scope: StoreScope,
        _query: &CatalogQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        Ok(self
            .0
            .iter()
            .skip(page.saturating_sub(1) * page_size)
            .take(page_size)
            .cloned()
            .collect())
    }
}

/// Catalog whose count call fails, to exercise the run-fatal path.
pub struct BrokenCatalog;

impl ProductCatalog for BrokenCatalog {
    fn count(&self, _scope: StoreScope, _query: &CatalogQuery) -> Result<usize, CatalogError> {
        Err(CatalogError("connection reset".to_string()))
    }

    fn page(
        &self,
        _scope: StoreScope,
        _query: &CatalogQuery,
        _page: usize,
        _page_size: usize,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        Err(CatalogError("connection reset".to_string()))
    }
}
