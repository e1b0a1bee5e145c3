//! Catalog product snapshot.

use serde::{Deserialize, Serialize};

use super::StoreScope;

/// Sentinel image value used by the host catalog when no image is selected.
pub const IMAGE_NO_SELECTION: &str = "no_selection";

/// A product as read from the host catalog.
///
/// This is a transient snapshot, never owned or mutated by the engine. Only
/// `sku` and `name` are required to build a sync payload; every other field
/// is optional and silently omitted from the wire format when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unique product code (SKU).
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Product type tag (e.g. `simple`, `configurable`, `virtual`).
    #[serde(default)]
    pub type_id: String,
    /// Canonical product page URL, if resolvable.
    #[serde(default)]
    pub url: Option<String>,
    /// Resolved media URL, or the literal [`IMAGE_NO_SELECTION`] sentinel.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Global trade item number. Only sent upstream when exactly 13 digits.
    #[serde(default)]
    pub gtin: Option<String>,
    /// Manufacturer part number.
    #[serde(default)]
    pub mpn: Option<String>,
    /// Brand attribute, mapped to the review platform's cluster code.
    #[serde(default)]
    pub brand: Option<String>,
    /// Variant-level SKU, sent only when it differs from `sku`.
    #[serde(default)]
    pub secondary_sku: Option<String>,
    /// Attribute-set tag used by the invitation exclusion rules.
    #[serde(default)]
    pub attribute_group: Option<String>,
    /// Owning store scope.
    #[serde(default)]
    pub scope: StoreScope,
}

impl ProductRecord {
    /// Minimal record with only the required fields set.
    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            type_id: String::new(),
            url: None,
            image_url: None,
            gtin: None,
            mpn: None,
            brand: None,
            secondary_sku: None,
            attribute_group: None,
            scope: StoreScope::default(),
        }
    }
}
