//! Scope-qualified configuration access.
//!
//! The host platform owns configuration storage (including encryption of the
//! API token); the engine reads through the [`ConfigSource`] trait, always
//! qualified by a [`StoreScope`]. There is no process-wide configuration
//! state: [`ScopedConfig`] re-reads on every accessor call, so a changed
//! setting takes effect on the next decision without any cache invalidation.

use std::collections::HashMap;

use kiyoh_sync_core::StoreScope;
use secrecy::{ExposeSecret, SecretString};

/// Configuration paths, mirroring the host platform's settings tree.
pub mod paths {
    pub const ENABLED: &str = "kiyoh_reviews/api_settings/enabled";
    pub const SERVER: &str = "kiyoh_reviews/api_settings/server";
    pub const LOCATION_ID: &str = "kiyoh_reviews/api_settings/location_id";
    /// Stored encrypted; must be read through `ConfigSource::get_secret`.
    pub const API_TOKEN: &str = "kiyoh_reviews/api_settings/api_token";

    pub const PRODUCT_SYNC_ENABLED: &str = "kiyoh_reviews/product_sync/enabled";
    pub const AUTO_SYNC_ENABLED: &str = "kiyoh_reviews/product_sync/auto_sync_enabled";
    pub const EXCLUDED_PRODUCT_TYPES: &str = "kiyoh_reviews/product_sync/excluded_product_types";
    pub const EXCLUDED_PRODUCT_CODES: &str = "kiyoh_reviews/product_sync/excluded_product_codes";
    pub const INITIAL_SYNC_DONE: &str = "kiyoh_reviews/product_sync/initial_sync_done";

    pub const INVITATIONS_ENABLED: &str = "kiyoh_reviews/review_invitations/enabled";
    pub const INVITATION_TYPE: &str = "kiyoh_reviews/review_invitations/invitation_type";
    pub const ORDER_STATUS_TRIGGER: &str = "kiyoh_reviews/review_invitations/order_status_trigger";
    pub const EXCLUDE_CUSTOMER_GROUPS: &str =
        "kiyoh_reviews/review_invitations/exclude_customer_groups";
    pub const EXCLUDE_PRODUCT_GROUPS: &str =
        "kiyoh_reviews/review_invitations/exclude_product_groups";
    pub const MAX_PRODUCTS_PER_INVITE: &str =
        "kiyoh_reviews/review_invitations/max_products_per_invite";
    pub const PRODUCT_SORT_ORDER: &str = "kiyoh_reviews/review_invitations/product_sort_order";
    pub const DELAY_DAYS: &str = "kiyoh_reviews/review_invitations/delay_days";
    pub const FALLBACK_LANGUAGE: &str = "kiyoh_reviews/review_invitations/fallback_language";

    /// Host platform's own store locale setting, used for invitation language
    /// detection when the locale resolver has no answer.
    pub const STORE_LOCALE: &str = "general/locale/code";
}

/// Scope-qualified configuration reader implemented by the host.
pub trait ConfigSource: Send + Sync {
    /// Read a raw setting for a store scope.
    fn get(&self, path: &str, scope: StoreScope) -> Option<String>;

    /// Read a secret setting, decrypted.
    ///
    /// The default implementation wraps the plain value; hosts with encrypted
    /// storage override this for the token path.
    fn get_secret(&self, path: &str, scope: StoreScope) -> Option<SecretString> {
        self.get(path, scope).map(SecretString::from)
    }
}

/// In-memory [`ConfigSource`], for tests and single-process hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<(u32, String), String>,
}

impl MemoryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, scope: StoreScope, path: &str, value: impl Into<String>) -> Self {
        self.set(scope, path, value);
        self
    }

    pub fn set(&mut self, scope: StoreScope, path: &str, value: impl Into<String>) {
        self.values
            .insert((scope.as_u32(), path.to_string()), value.into());
    }
}

impl ConfigSource for MemoryConfig {
    fn get(&self, path: &str, scope: StoreScope) -> Option<String> {
        self.values
            .get(&(scope.as_u32(), path.to_string()))
            .cloned()
    }
}

/// Review-platform server selector.
///
/// Two production endpoints exist; an unknown selector falls back to the
/// international one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Server {
    /// Kiyoh International (`kiyoh.com`).
    Kiyoh,
    /// Klantenvertellen (`klantenvertellen.nl`).
    Klantenvertellen,
}

impl Server {
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "klantenvertellen.nl" => Self::Klantenvertellen,
            _ => Self::Kiyoh,
        }
    }

    /// Base URL for API requests.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Kiyoh => "https://www.kiyoh.com",
            Self::Klantenvertellen => "https://www.klantenvertellen.nl",
        }
    }
}

/// Which invitation variant an order triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvitationType {
    /// Ask for product reviews only.
    ProductOnly,
    /// Ask for a shop review only.
    ShopOnly,
    /// Ask for both in one invitation.
    #[default]
    ShopAndProduct,
}

impl InvitationType {
    #[must_use]
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("product_only") => Self::ProductOnly,
            Some("shop_only") => Self::ShopOnly,
            _ => Self::ShopAndProduct,
        }
    }
}

/// Ordering applied to extracted product codes before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortOrder {
    /// Original cart order.
    #[default]
    CartOrder,
    PriceDesc,
    PriceAsc,
    NameAsc,
    NameDesc,
    SkuAsc,
    SkuDesc,
}

impl ProductSortOrder {
    #[must_use]
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("price_desc") => Self::PriceDesc,
            Some("price_asc") => Self::PriceAsc,
            Some("name_asc") => Self::NameAsc,
            Some("name_desc") => Self::NameDesc,
            Some("sku_asc") => Self::SkuAsc,
            Some("sku_desc") => Self::SkuDesc,
            _ => Self::CartOrder,
        }
    }
}

/// Default number of product codes attached to one invitation.
pub const DEFAULT_MAX_PRODUCTS_PER_INVITE: usize = 10;

/// Default invitation delay in days, applied only when the setting is absent.
pub const DEFAULT_DELAY_DAYS: u32 = 7;

/// Typed, per-call view of one scope's settings.
///
/// Accessors go back to the [`ConfigSource`] on every call; nothing is cached
/// here, matching the engine's no-shared-state model.
pub struct ScopedConfig<'a> {
    source: &'a dyn ConfigSource,
    scope: StoreScope,
}

impl<'a> ScopedConfig<'a> {
    #[must_use]
    pub fn new(source: &'a dyn ConfigSource, scope: StoreScope) -> Self {
        Self { source, scope }
    }

    #[must_use]
    pub const fn scope(&self) -> StoreScope {
        self.scope
    }

    fn get(&self, path: &str) -> Option<String> {
        self.source.get(path, self.scope)
    }

    fn flag(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| parse_flag(&v))
    }

    /// Non-empty value, `None` when the setting is absent or blank.
    fn get_non_empty(&self, path: &str) -> Option<String> {
        self.get(path).filter(|v| !v.trim().is_empty())
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.flag(paths::ENABLED)
    }

    #[must_use]
    pub fn invitations_enabled(&self) -> bool {
        self.flag(paths::INVITATIONS_ENABLED)
    }

    #[must_use]
    pub fn product_sync_enabled(&self) -> bool {
        self.flag(paths::PRODUCT_SYNC_ENABLED)
    }

    #[must_use]
    pub fn auto_sync_enabled(&self) -> bool {
        self.flag(paths::AUTO_SYNC_ENABLED)
    }

    #[must_use]
    pub fn server(&self) -> Server {
        self.get(paths::SERVER)
            .map_or(Server::Kiyoh, |v| Server::from_selector(&v))
    }

    /// Decrypted API token; a blank value reads as absent.
    #[must_use]
    pub fn api_token(&self) -> Option<SecretString> {
        self.source
            .get_secret(paths::API_TOKEN, self.scope)
            .filter(|token| !token.expose_secret().trim().is_empty())
    }

    #[must_use]
    pub fn location_id(&self) -> Option<String> {
        self.get_non_empty(paths::LOCATION_ID)
    }

    /// Excluded product type tags, split on commas without trimming.
    #[must_use]
    pub fn excluded_product_types(&self) -> Vec<String> {
        split_csv(self.get(paths::EXCLUDED_PRODUCT_TYPES), false)
    }

    /// Excluded SKUs, split on commas and trimmed.
    #[must_use]
    pub fn excluded_product_codes(&self) -> Vec<String> {
        split_csv(self.get(paths::EXCLUDED_PRODUCT_CODES), true)
    }

    #[must_use]
    pub fn invitation_type(&self) -> InvitationType {
        InvitationType::from_config(self.get(paths::INVITATION_TYPE).as_deref())
    }

    /// Order statuses that trigger an invitation.
    ///
    /// An unset or empty setting yields an empty list: no status ever
    /// triggers. This is a closed allow-list, not "always on".
    #[must_use]
    pub fn trigger_statuses(&self) -> Vec<String> {
        split_csv(self.get(paths::ORDER_STATUS_TRIGGER), false)
    }

    /// Customer group ids excluded from invitations; unset excludes nobody.
    #[must_use]
    pub fn excluded_customer_groups(&self) -> Vec<String> {
        split_csv(self.get(paths::EXCLUDE_CUSTOMER_GROUPS), false)
    }

    /// Product attribute groups excluded from invitation product lists.
    #[must_use]
    pub fn excluded_product_groups(&self) -> Vec<String> {
        split_csv(self.get(paths::EXCLUDE_PRODUCT_GROUPS), false)
    }

    /// Maximum product codes per invitation. Unset, unparseable, or zero
    /// falls back to [`DEFAULT_MAX_PRODUCTS_PER_INVITE`].
    #[must_use]
    pub fn max_products_per_invite(&self) -> usize {
        let configured = self
            .get(paths::MAX_PRODUCTS_PER_INVITE)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if configured == 0 {
            DEFAULT_MAX_PRODUCTS_PER_INVITE
        } else {
            configured
        }
    }

    #[must_use]
    pub fn product_sort_order(&self) -> ProductSortOrder {
        ProductSortOrder::from_config(self.get(paths::PRODUCT_SORT_ORDER).as_deref())
    }

    /// Invitation delay in days.
    ///
    /// `None` only when the setting is absent or empty; an explicit `0` is
    /// preserved, and a non-numeric value degrades to `0` rather than the
    /// default.
    #[must_use]
    pub fn delay_days(&self) -> Option<u32> {
        self.get_non_empty(paths::DELAY_DAYS)
            .map(|v| v.trim().parse::<u32>().unwrap_or(0))
    }

    /// Language used when the order locale maps to nothing supported.
    #[must_use]
    pub fn fallback_language(&self) -> String {
        self.get_non_empty(paths::FALLBACK_LANGUAGE)
            .unwrap_or_else(|| "en".to_string())
    }

    #[must_use]
    pub fn store_locale(&self) -> Option<String> {
        self.get_non_empty(paths::STORE_LOCALE)
    }

    #[must_use]
    pub fn initial_sync_done(&self) -> bool {
        self.flag(paths::INITIAL_SYNC_DONE)
    }
}

/// Host-style truthiness: `1`, `true`, and `yes` enable a flag.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn split_csv(value: Option<String>, trim: bool) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(',')
        .map(|part| {
            if trim {
                part.trim().to_string()
            } else {
                part.to_string()
            }
        })
        .collect()
}
