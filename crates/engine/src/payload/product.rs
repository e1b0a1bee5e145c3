//! Product upsert payload.

use kiyoh_sync_core::{IMAGE_NO_SELECTION, ProductRecord};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// A product record that cannot be synced at all.
///
/// Only a blank SKU or name is fatal; every optional attribute is simply
/// omitted from the payload when unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("product {sku:?} must have a SKU and a name")]
pub struct InvalidProduct {
    /// SKU of the offending record, possibly blank.
    pub sku: String,
}

/// Body for the product upsert endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPayload {
    pub location_id: String,
    pub product_code: String,
    pub product_name: String,
    pub source_url: String,
    pub image_url: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skus: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_code: Option<String>,
}

/// Build the upsert payload for one product.
///
/// # Errors
///
/// Returns [`InvalidProduct`] when the record has no SKU or no name.
pub fn build_product_payload(
    product: &ProductRecord,
    location_id: &str,
) -> Result<ProductPayload, InvalidProduct> {
    if product.sku.trim().is_empty() || product.name.trim().is_empty() {
        return Err(InvalidProduct {
            sku: product.sku.clone(),
        });
    }

    let source_url = product
        .url
        .as_deref()
        .filter(|u| is_absolute_http_url(u))
        .map_or_else(|| fallback_product_url(&product.sku), String::from);

    let image_url = product
        .image_url
        .as_deref()
        .filter(|u| *u != IMAGE_NO_SELECTION)
        .filter(|u| is_absolute_http_url(u))
        .map_or_else(|| fallback_image_url(&product.name), String::from);

    let skus = product
        .secondary_sku
        .as_ref()
        .filter(|s| !s.trim().is_empty() && **s != product.sku)
        .map(|s| vec![s.clone()]);

    let gtins = product
        .gtin
        .as_ref()
        .filter(|g| is_valid_gtin(g))
        .map(|g| vec![g.clone()]);

    let mpns = product
        .mpn
        .as_ref()
        .filter(|m| !m.trim().is_empty())
        .map(|m| vec![m.clone()]);

    let cluster_code = product
        .brand
        .as_ref()
        .filter(|b| !b.trim().is_empty())
        .cloned();

    Ok(ProductPayload {
        location_id: location_id.to_string(),
        product_code: product.sku.clone(),
        product_name: product.name.clone(),
        source_url,
        image_url,
        active: true,
        skus,
        gtins,
        mpns,
        cluster_code,
    })
}

/// The upstream only accepts 13-digit GTINs.
fn is_valid_gtin(gtin: &str) -> bool {
    gtin.len() == 13 && gtin.bytes().all(|b| b.is_ascii_digit())
}

fn is_absolute_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn fallback_product_url(sku: &str) -> String {
    format!(
        "https://example.com/product/{}",
        urlencoding::encode(&sku.to_lowercase())
    )
}

fn fallback_image_url(name: &str) -> String {
    format!(
        "https://via.placeholder.com/300x300.png?text={}",
        urlencoding::encode(name)
    )
}
