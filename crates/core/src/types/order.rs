//! Order snapshot used for invitation dispatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductRecord, StoreScope};

/// Shipping address name fields, used as a fallback when the order carries no
/// customer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

/// A single order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The purchased product, if still resolvable from the catalog.
    #[serde(default)]
    pub product: Option<ProductRecord>,
    /// Paid unit price.
    pub price: Decimal,
    /// Whether the item is visible on the order (child items of configurable
    /// products are not).
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl OrderItem {
    /// A visible line item for `product` at `price`.
    #[must_use]
    pub const fn new(product: Option<ProductRecord>, price: Decimal) -> Self {
        Self {
            product,
            price,
            visible: true,
        }
    }
}

/// An order as read from the host sales store.
///
/// Transient per-event snapshot; the engine never mutates or persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Internal order id.
    pub id: u64,
    /// Human-readable order reference (increment id).
    #[serde(default)]
    pub increment_id: Option<String>,
    /// Customer email; invitations cannot be sent without one.
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_firstname: Option<String>,
    #[serde(default)]
    pub customer_lastname: Option<String>,
    /// Customer group id, compared against the excluded-groups setting.
    #[serde(default)]
    pub customer_group_id: Option<String>,
    /// Current order status tag (e.g. `complete`, `processing`).
    pub status: String,
    /// Owning store scope.
    #[serde(default)]
    pub scope: StoreScope,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    /// All line items, visible or not.
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl OrderRecord {
    /// Iterate over the visible line items in cart order.
    pub fn visible_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| item.visible)
    }
}
