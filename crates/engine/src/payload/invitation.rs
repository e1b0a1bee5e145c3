//! Invitation payload.

use kiyoh_sync_core::OrderRecord;
use serde::Serialize;
use tracing::debug;

use crate::config::{DEFAULT_DELAY_DAYS, ScopedConfig};
use crate::locale::{LocaleSource, map_language};

/// Reference code used when an order carries no increment id.
const FALLBACK_REFERENCE_CODE: &str = "test-order";

/// Body for the invitation endpoint, minus the `product_invite` flag the
/// client attaches at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationPayload {
    pub location_id: String,
    pub invite_email: String,
    /// Days the platform waits before mailing the customer.
    pub delay: u32,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub reference_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<Vec<String>>,
}

/// Build the invitation payload for an order.
///
/// `delay` keeps an explicitly configured `0`; only an absent setting falls
/// back to [`DEFAULT_DELAY_DAYS`]. Customer names fall back to the shipping
/// address per field. `product_code` is attached only when `product_codes`
/// is non-empty.
#[must_use]
pub fn build_invitation_payload(
    order: &OrderRecord,
    product_codes: &[String],
    config: &ScopedConfig<'_>,
    locale: &dyn LocaleSource,
) -> InvitationPayload {
    let delay = config.delay_days().unwrap_or(DEFAULT_DELAY_DAYS);
    let language = detect_language(order, config, locale);

    let shipping = order.shipping_address.as_ref();
    let first_name = order
        .customer_firstname
        .clone()
        .or_else(|| shipping.and_then(|a| a.firstname.clone()));
    let last_name = order
        .customer_lastname
        .clone()
        .or_else(|| shipping.and_then(|a| a.lastname.clone()));

    InvitationPayload {
        location_id: config.location_id().unwrap_or_default(),
        invite_email: order.customer_email.clone().unwrap_or_default(),
        delay,
        language,
        first_name,
        last_name,
        reference_code: order
            .increment_id
            .clone()
            .unwrap_or_else(|| FALLBACK_REFERENCE_CODE.to_string()),
        product_code: if product_codes.is_empty() {
            None
        } else {
            Some(product_codes.to_vec())
        },
    }
}

/// Resolve the invitation language for an order.
///
/// The active locale from the resolver wins; the store's own locale setting
/// is the second choice; the configured fallback language closes the gap.
fn detect_language(
    order: &OrderRecord,
    config: &ScopedConfig<'_>,
    locale: &dyn LocaleSource,
) -> String {
    let fallback = config.fallback_language();

    if let Some(current) = locale.current_locale(order.scope) {
        return map_language(&current, &fallback);
    }

    if let Some(store_locale) = config.store_locale() {
        return map_language(&store_locale, &fallback);
    }

    debug!(order_id = order.id, fallback = %fallback, "no locale resolvable for order, using fallback language");
    fallback
}
