//! Order-event invitation dispatch.
//!
//! Triggered once per order state change. An order passes a gate sequence
//! (invitations enabled, status on the trigger list, customer group not
//! excluded, email present); its line items are distilled into a ranked,
//! deduplicated product code list; and the configured invitation variant is
//! sent. A product-related rejection earns exactly one resync-and-retry
//! cycle; every other failure is terminal.

use std::sync::Arc;

use kiyoh_sync_core::OrderRecord;
use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

use crate::client::KiyohClient;
use crate::config::{ConfigSource, InvitationType, ProductSortOrder, ScopedConfig};
use crate::locale::LocaleSource;
use crate::payload::{build_invitation_payload, build_product_payload};

/// Why an order produced no invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Invitations are switched off for the scope.
    Disabled,
    /// Order status is not on the configured trigger list. An unset list
    /// triggers on nothing.
    StatusNotTriggered,
    /// Customer belongs to an excluded group.
    CustomerGroupExcluded,
    /// Order has no usable customer email.
    MissingEmail,
    /// Product-only invitations need at least one eligible product code.
    NoEligibleProducts,
}

/// Which invitation variant went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationKind {
    Shop,
    Product,
    Combined,
}

/// Result of processing one order event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    Sent {
        kind: InvitationKind,
        /// Whether the send succeeded only on the post-resync retry.
        retried: bool,
    },
    Failed {
        kind: InvitationKind,
        /// Wire-style code of the terminal failure.
        error_code: String,
        retried: bool,
    },
}

/// Dispatches review invitations for order events.
#[derive(Clone)]
pub struct InvitationDispatcher {
    config: Arc<dyn ConfigSource>,
    locale: Arc<dyn LocaleSource>,
    client: KiyohClient,
}

impl std::fmt::Debug for InvitationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationDispatcher").finish_non_exhaustive()
    }
}

impl InvitationDispatcher {
    #[must_use]
    pub fn new(
        config: Arc<dyn ConfigSource>,
        locale: Arc<dyn LocaleSource>,
        client: KiyohClient,
    ) -> Self {
        Self {
            config,
            locale,
            client,
        }
    }

    /// Process one order save event.
    ///
    /// Never raises: every internal failure is folded into the returned
    /// [`DispatchOutcome`] after being logged with the order id.
    #[instrument(skip(self, order), fields(order_id = order.id, scope = %order.scope))]
    pub async fn handle_order_saved(&self, order: &OrderRecord) -> DispatchOutcome {
        let config = ScopedConfig::new(self.config.as_ref(), order.scope);
        info!(status = %order.status, "order save event received");

        if let Some(reason) = gate_order(order, &config) {
            info!(?reason, "order skipped");
            return DispatchOutcome::Skipped(reason);
        }

        let invitation_type = config.invitation_type();
        let codes = extract_product_codes(order, &config);
        debug!(
            count = codes.len(),
            ?invitation_type,
            "extracted product codes from order"
        );

        match invitation_type {
            InvitationType::ProductOnly => {
                if codes.is_empty() {
                    info!("no products found for product-only invitation");
                    DispatchOutcome::Skipped(SkipReason::NoEligibleProducts)
                } else {
                    self.send_with_retry(order, &codes, InvitationKind::Product, true)
                        .await
                }
            }
            InvitationType::ShopOnly => self.send_shop_invitation(order, &config).await,
            InvitationType::ShopAndProduct => {
                if codes.is_empty() {
                    info!("sending shop-only invitation (no valid products)");
                    self.send_shop_invitation(order, &config).await
                } else {
                    self.send_with_retry(order, &codes, InvitationKind::Combined, false)
                        .await
                }
            }
        }
    }

    /// Shop-only invitation: failures are logged but never retried.
    async fn send_shop_invitation(
        &self,
        order: &OrderRecord,
        config: &ScopedConfig<'_>,
    ) -> DispatchOutcome {
        let payload = build_invitation_payload(order, &[], config, self.locale.as_ref());
        match self
            .client
            .send_invitation(&payload, order.scope, false)
            .await
        {
            Ok(_) => {
                info!("shop invitation sent successfully");
                DispatchOutcome::Sent {
                    kind: InvitationKind::Shop,
                    retried: false,
                }
            }
            Err(failure) => {
                error!(code = failure.code(), "shop invitation failed");
                DispatchOutcome::Failed {
                    kind: InvitationKind::Shop,
                    error_code: failure.code().to_string(),
                    retried: false,
                }
            }
        }
    }

    /// Two-attempt protocol: send, and on a product-related rejection,
    /// resync the order's products and send the identical payload once more.
    /// The retry happens regardless of how the resync went; there is no
    /// third attempt.
    async fn send_with_retry(
        &self,
        order: &OrderRecord,
        codes: &[String],
        kind: InvitationKind,
        product_invite: bool,
    ) -> DispatchOutcome {
        let config = ScopedConfig::new(self.config.as_ref(), order.scope);
        let payload = build_invitation_payload(order, codes, &config, self.locale.as_ref());
        info!(product_count = codes.len(), ?kind, "attempting invitation");

        let failure = match self
            .client
            .send_invitation(&payload, order.scope, product_invite)
            .await
        {
            Ok(_) => {
                info!("invitation sent successfully");
                return DispatchOutcome::Sent {
                    kind,
                    retried: false,
                };
            }
            Err(failure) => failure,
        };

        if !failure.is_product_related() {
            info!(
                code = failure.code(),
                "error does not require product sync, skipping retry"
            );
            return DispatchOutcome::Failed {
                kind,
                error_code: failure.code().to_string(),
                retried: false,
            };
        }

        info!(
            code = failure.code(),
            "error indicates missing products, syncing and retrying"
        );
        self.resync_order_products(order, &config).await;

        info!("retrying invitation after product sync");
        match self
            .client
            .send_invitation(&payload, order.scope, product_invite)
            .await
        {
            Ok(_) => {
                info!("invitation retry successful");
                DispatchOutcome::Sent {
                    kind,
                    retried: true,
                }
            }
            Err(retry_failure) => {
                error!(code = retry_failure.code(), "invitation retry failed");
                DispatchOutcome::Failed {
                    kind,
                    error_code: retry_failure.code().to_string(),
                    retried: true,
                }
            }
        }
    }

    /// Upsert the order's visible-item products individually, stopping after
    /// `max_products_per_invite` successes. Eligibility is deliberately not
    /// re-checked: a product the invitation referenced must reach the
    /// platform even if sync rules would normally skip it.
    async fn resync_order_products(&self, order: &OrderRecord, config: &ScopedConfig<'_>) {
        let max_products = config.max_products_per_invite();
        let location_id = config.location_id().unwrap_or_default();
        let mut synced = 0usize;
        let mut failed = 0usize;

        info!(max_products, "starting product sync for order");
        for item in order.visible_items() {
            if synced >= max_products {
                break;
            }
            let Some(product) = &item.product else {
                debug!("no product for order item");
                continue;
            };

            match build_product_payload(product, &location_id) {
                Ok(payload) => match self.client.sync_product(&payload, order.scope).await {
                    Ok(()) => {
                        synced += 1;
                        info!(sku = %product.sku, "order product synced");
                    }
                    Err(failure) => {
                        failed += 1;
                        warn!(sku = %product.sku, code = failure.code(), "order product sync failed");
                    }
                },
                Err(invalid) => {
                    failed += 1;
                    warn!(sku = %invalid.sku, "cannot build payload for order product");
                }
            }
        }
        info!(synced, failed, "order product sync completed");
    }
}

/// First gate that fails, or `None` when the order should be processed.
fn gate_order(order: &OrderRecord, config: &ScopedConfig<'_>) -> Option<SkipReason> {
    if !config.invitations_enabled() {
        return Some(SkipReason::Disabled);
    }

    if !config.trigger_statuses().contains(&order.status) {
        return Some(SkipReason::StatusNotTriggered);
    }

    if let Some(group) = &order.customer_group_id {
        if config.excluded_customer_groups().contains(group) {
            return Some(SkipReason::CustomerGroupExcluded);
        }
    }

    if order
        .customer_email
        .as_deref()
        .is_none_or(|email| email.trim().is_empty())
    {
        return Some(SkipReason::MissingEmail);
    }

    None
}

struct CartEntry {
    sku: String,
    name: String,
    price: Decimal,
}

/// Distill an order into the product codes an invitation should reference.
///
/// Visible items only; items without a resolvable product, with a blank SKU,
/// or in an excluded attribute group are skipped. Duplicates collapse to the
/// first occurrence, which also fixes their position for the default cart
/// ordering and for sort ties (all sorts are stable). The result is truncated
/// to the scope's max-products-per-invite.
#[must_use]
pub fn extract_product_codes(order: &OrderRecord, config: &ScopedConfig<'_>) -> Vec<String> {
    let max_products = config.max_products_per_invite();
    let sort_order = config.product_sort_order();
    let excluded_groups = config.excluded_product_groups();

    let mut entries: Vec<CartEntry> = Vec::new();
    for item in order.visible_items() {
        let Some(product) = &item.product else {
            continue;
        };

        if let Some(group) = &product.attribute_group {
            if excluded_groups.contains(group) {
                debug!(
                    order_id = order.id,
                    sku = %product.sku,
                    group = %group,
                    "product excluded by attribute group"
                );
                continue;
            }
        }

        if product.sku.is_empty() {
            continue;
        }

        if entries.iter().any(|entry| entry.sku == product.sku) {
            continue;
        }

        entries.push(CartEntry {
            sku: product.sku.clone(),
            name: product.name.clone(),
            price: item.price,
        });
    }

    sort_entries(&mut entries, sort_order);

    entries
        .into_iter()
        .take(max_products)
        .map(|entry| entry.sku)
        .collect()
}

/// All sorts are stable, so equal keys keep their cart position.
fn sort_entries(entries: &mut [CartEntry], order: ProductSortOrder) {
    match order {
        // Entries are collected in cart order already.
        ProductSortOrder::CartOrder => {}
        ProductSortOrder::PriceDesc => entries.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSortOrder::PriceAsc => entries.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSortOrder::NameAsc => entries.sort_by_key(|e| e.name.to_lowercase()),
        ProductSortOrder::NameDesc => {
            entries.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
        }
        ProductSortOrder::SkuAsc => entries.sort_by_key(|e| e.sku.to_lowercase()),
        ProductSortOrder::SkuDesc => {
            entries.sort_by(|a, b| b.sku.to_lowercase().cmp(&a.sku.to_lowercase()));
        }
    }
}
