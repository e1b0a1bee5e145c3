//! Review-platform error classification.

use thiserror::Error;

/// Upstream error codes that mean the platform has no usable record of a
/// referenced product. These are the only failures worth a resync-and-retry;
/// everything else (duplicate invites, credential problems, transport noise)
/// is terminal.
const PRODUCT_ERROR_CODES: &[&str] = &[
    "INVALID_PRODUCT_ID",
    "PRODUCT_NOT_FOUND",
    "UNKNOWN_PRODUCT",
    "MISSING_PRODUCT",
    "PRODUCT_DOES_NOT_EXIST",
    "INVALID_PRODUCT_CODE",
    "PRODUCT_NOT_AVAILABLE",
];

/// Classified failure of a review-platform call.
///
/// The configuration variants short-circuit before any network I/O; the rest
/// classify what came back. Public operations return this instead of raising,
/// so callers pattern-match on the failure kind.
#[derive(Debug, Clone, Error)]
pub enum ApiFailure {
    /// The integration (or the specific feature) is switched off for the
    /// scope. No request was made.
    #[error("review invitations disabled")]
    Disabled,

    /// No API token configured for the scope. No request was made.
    #[error("missing API token")]
    MissingToken,

    /// No location id configured for the scope. No request was made.
    #[error("missing location id")]
    MissingLocationId,

    /// Connection or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not JSON.
    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    /// The platform answered with an error code, surfaced verbatim.
    #[error("{code}: {message}")]
    Upstream {
        code: String,
        message: String,
        response: serde_json::Value,
    },
}

impl ApiFailure {
    /// Wire-style error code for logs and result surfaces.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Disabled => "DISABLED",
            Self::MissingToken => "MISSING_TOKEN",
            Self::MissingLocationId => "MISSING_LOCATION_ID",
            Self::Transport(_) => "CURL_ERROR",
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::Upstream { code, .. } => code,
        }
    }

    /// Whether re-syncing the referenced products could fix this failure.
    #[must_use]
    pub fn is_product_related(&self) -> bool {
        matches!(self, Self::Upstream { code, .. } if PRODUCT_ERROR_CODES.contains(&code.as_str()))
    }
}
