//! Environment-backed configuration source.
//!
//! Maps the engine's configuration paths onto `KIYOH_*` environment
//! variables, with optional `KIYOH_STORE_<scope>_*` overrides so multi-store
//! setups can be exercised from one shell. The API token arrives through the
//! environment already in the clear, so the default secret handling applies.

use kiyoh_sync::config::{ConfigSource, paths};
use kiyoh_sync_core::StoreScope;

/// [`ConfigSource`] reading `KIYOH_*` environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl EnvConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfigSource for EnvConfig {
    fn get(&self, path: &str, scope: StoreScope) -> Option<String> {
        let base = env_key(path)?;

        if scope.as_u32() != 0 {
            let suffix = base.strip_prefix("KIYOH_").unwrap_or(base);
            let scoped = format!("KIYOH_STORE_{}_{}", scope.as_u32(), suffix);
            if let Ok(value) = std::env::var(&scoped) {
                return Some(value);
            }
        }

        std::env::var(base).ok()
    }
}

fn env_key(path: &str) -> Option<&'static str> {
    let key = match path {
        paths::ENABLED => "KIYOH_ENABLED",
        paths::SERVER => "KIYOH_SERVER",
        paths::LOCATION_ID => "KIYOH_LOCATION_ID",
        paths::API_TOKEN => "KIYOH_API_TOKEN",
        paths::PRODUCT_SYNC_ENABLED => "KIYOH_PRODUCT_SYNC_ENABLED",
        paths::AUTO_SYNC_ENABLED => "KIYOH_AUTO_SYNC_ENABLED",
        paths::EXCLUDED_PRODUCT_TYPES => "KIYOH_EXCLUDED_PRODUCT_TYPES",
        paths::EXCLUDED_PRODUCT_CODES => "KIYOH_EXCLUDED_PRODUCT_CODES",
        paths::INITIAL_SYNC_DONE => "KIYOH_INITIAL_SYNC_DONE",
        paths::INVITATIONS_ENABLED => "KIYOH_INVITATIONS_ENABLED",
        paths::INVITATION_TYPE => "KIYOH_INVITATION_TYPE",
        paths::ORDER_STATUS_TRIGGER => "KIYOH_ORDER_STATUS_TRIGGER",
        paths::EXCLUDE_CUSTOMER_GROUPS => "KIYOH_EXCLUDE_CUSTOMER_GROUPS",
        paths::EXCLUDE_PRODUCT_GROUPS => "KIYOH_EXCLUDE_PRODUCT_GROUPS",
        paths::MAX_PRODUCTS_PER_INVITE => "KIYOH_MAX_PRODUCTS_PER_INVITE",
        paths::PRODUCT_SORT_ORDER => "KIYOH_PRODUCT_SORT_ORDER",
        paths::DELAY_DAYS => "KIYOH_DELAY_DAYS",
        paths::FALLBACK_LANGUAGE => "KIYOH_FALLBACK_LANGUAGE",
        paths::STORE_LOCALE => "KIYOH_STORE_LOCALE",
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_path_maps_to_a_variable() {
        for path in [
            paths::ENABLED,
            paths::SERVER,
            paths::LOCATION_ID,
            paths::API_TOKEN,
            paths::PRODUCT_SYNC_ENABLED,
            paths::INVITATIONS_ENABLED,
            paths::ORDER_STATUS_TRIGGER,
            paths::STORE_LOCALE,
        ] {
            assert!(env_key(path).is_some(), "path {path}");
        }
        assert!(env_key("unrelated/path").is_none());
    }
}
