//! Paged product catalog access.
//!
//! The host platform owns the catalog; the engine reads it through
//! [`ProductCatalog`] in fixed-size pages so a full sync never materializes
//! the whole catalog at once.

use kiyoh_sync_core::{ProductRecord, StoreScope};
use thiserror::Error;

/// Catalog read failure. Treated as run-fatal when counting candidates and
/// batch-local when reading a page.
#[derive(Debug, Clone, Error)]
#[error("catalog read failed: {0}")]
pub struct CatalogError(pub String);

/// Coarse exclusion filter pushed down to the catalog query.
///
/// The eligibility filter re-applies the same rules per product afterwards;
/// the query-level filter just keeps excluded rows out of the page reads.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub excluded_types: Vec<String>,
    pub excluded_codes: Vec<String>,
}

impl CatalogQuery {
    /// Whether a product passes the query-level exclusions.
    #[must_use]
    pub fn matches(&self, product: &ProductRecord) -> bool {
        !self.excluded_types.contains(&product.type_id) && !self.excluded_codes.contains(&product.sku)
    }
}

/// Paged catalog reader implemented by the host.
///
/// Pages are 1-based, mirroring the host platform's collection paging.
pub trait ProductCatalog: Send + Sync {
    /// Number of candidate products for the scope under `query`.
    fn count(&self, scope: StoreScope, query: &CatalogQuery) -> Result<usize, CatalogError>;

    /// Read one page of candidates.
    fn page(
        &self,
        scope: StoreScope,
        query: &CatalogQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<ProductRecord>, CatalogError>;
}

/// In-memory [`ProductCatalog`] over a fixed product list, for tests and the
/// CLI's file-backed catalog.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<ProductRecord>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    fn candidates(&self, scope: StoreScope, query: &CatalogQuery) -> Vec<&ProductRecord> {
        self.products
            .iter()
            .filter(|p| scope.as_u32() == 0 || p.scope == scope)
            .filter(|p| query.matches(p))
            .collect()
    }
}

impl ProductCatalog for MemoryCatalog {
    fn count(&self, scope: StoreScope, query: &CatalogQuery) -> Result<usize, CatalogError> {
        Ok(self.candidates(scope, query).len())
    }

    fn page(
        &self,
        scope: StoreScope,
        query: &CatalogQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        let start = page.saturating_sub(1) * page_size;
        Ok(self
            .candidates(scope, query)
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect())
    }
}
