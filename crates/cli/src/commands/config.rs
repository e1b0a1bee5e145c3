//! Configuration inspection command.

use kiyoh_sync::config::{InvitationType, ProductSortOrder, ScopedConfig, Server};
use kiyoh_sync_core::StoreScope;

use crate::env_config::EnvConfig;

/// Print the effective settings for a scope.
pub fn check(scope: u32) {
    let scope = StoreScope::new(scope);
    let source = EnvConfig::new();
    let config = ScopedConfig::new(&source, scope);

    println!();
    println!("Kiyoh Reviews Configuration Check");
    println!("=================================");
    println!("Scope: {scope}");
    println!();

    println!("API settings:");
    println!("  enabled:              {}", config.enabled());
    println!(
        "  server:               {}",
        match config.server() {
            Server::Kiyoh => "kiyoh.com",
            Server::Klantenvertellen => "klantenvertellen.nl",
        }
    );
    println!(
        "  location id:          {}",
        config.location_id().unwrap_or_else(|| "(not set)".into())
    );
    println!(
        "  api token:            {}",
        if config.api_token().is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!();

    println!("Product sync:");
    println!("  enabled:              {}", config.product_sync_enabled());
    println!("  auto sync on save:    {}", config.auto_sync_enabled());
    println!(
        "  excluded types:       {}",
        display_list(&config.excluded_product_types())
    );
    println!(
        "  excluded codes:       {}",
        display_list(&config.excluded_product_codes())
    );
    println!();

    println!("Review invitations:");
    println!("  enabled:              {}", config.invitations_enabled());
    println!(
        "  invitation type:      {}",
        match config.invitation_type() {
            InvitationType::ProductOnly => "product_only",
            InvitationType::ShopOnly => "shop_only",
            InvitationType::ShopAndProduct => "shop_and_product",
        }
    );
    println!(
        "  trigger statuses:     {}",
        display_list(&config.trigger_statuses())
    );
    println!(
        "  excluded groups:      {}",
        display_list(&config.excluded_customer_groups())
    );
    println!(
        "  max products/invite:  {}",
        config.max_products_per_invite()
    );
    println!(
        "  product sort order:   {}",
        match config.product_sort_order() {
            ProductSortOrder::CartOrder => "cart_order",
            ProductSortOrder::PriceDesc => "price_desc",
            ProductSortOrder::PriceAsc => "price_asc",
            ProductSortOrder::NameAsc => "name_asc",
            ProductSortOrder::NameDesc => "name_desc",
            ProductSortOrder::SkuAsc => "sku_asc",
            ProductSortOrder::SkuDesc => "sku_desc",
        }
    );
    println!(
        "  delay days:           {}",
        config
            .delay_days()
            .map_or_else(|| "(default 7)".to_string(), |d| d.to_string())
    );
    println!("  fallback language:    {}", config.fallback_language());
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}
