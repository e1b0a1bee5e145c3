//! Store scope identifier.

use serde::{Deserialize, Serialize};

/// A store/locale-specific configuration context.
///
/// Every configuration read and every sync or invitation decision is
/// qualified by a scope; there is no global default scope inside the engine.
/// Scope `0` conventionally means the host platform's base store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StoreScope(u32);

impl StoreScope {
    /// Create a scope from the host platform's store id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying store id.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StoreScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StoreScope {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<StoreScope> for u32 {
    fn from(scope: StoreScope) -> Self {
        scope.0
    }
}
