//! Review-platform HTTP client.
//!
//! The only network boundary in the engine. Requests go to one of two
//! production endpoints selected per scope (see [`Server`](crate::config::Server));
//! every authenticated call carries the scope's API token in a custom header.
//! Write calls use short fixed timeouts, the bulk upsert five times that;
//! there is no cancellation, a call either completes or fails after timeout.

mod error;
mod validation;

pub use error::ApiFailure;

use std::sync::Arc;
use std::time::Duration;

use kiyoh_sync_core::{BatchOutcome, StoreScope};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ConfigSource, ScopedConfig};
use crate::payload::{InvitationPayload, ProductPayload};

/// Authentication header expected by the publication API.
const TOKEN_HEADER: &str = "X-Publication-Api-Token";

/// Timeout for read-only statistics calls.
const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Timeout for invitation and single product upsert calls.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout for the bulk upsert: 5x the write timeout.
const BULK_TIMEOUT: Duration = Duration::from_secs(10);

/// Successful invitation response.
#[derive(Debug, Clone)]
pub struct InvitationReceipt {
    pub message: String,
    /// Raw response body, passed through for the host's bookkeeping.
    pub response: serde_json::Value,
}

/// Client for the Kiyoh/Klantenvertellen publication API.
///
/// Cheap to clone; configuration is re-read per call through the injected
/// [`ConfigSource`], so a token or server change applies to the next request.
#[derive(Clone)]
pub struct KiyohClient {
    http: reqwest::Client,
    config: Arc<dyn ConfigSource>,
    base_override: Option<String>,
}

impl std::fmt::Debug for KiyohClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KiyohClient")
            .field("base_override", &self.base_override)
            .finish_non_exhaustive()
    }
}

impl KiyohClient {
    /// Create a client reading credentials and server selection from `config`.
    #[must_use]
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            base_override: None,
        }
    }

    /// Route every request to `base` instead of the configured server.
    ///
    /// Used by tests and staging setups; production resolution goes through
    /// the scope's server setting.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_override = Some(base.into());
        self
    }

    fn scoped(&self, scope: StoreScope) -> ScopedConfig<'_> {
        ScopedConfig::new(self.config.as_ref(), scope)
    }

    fn base_url(&self, config: &ScopedConfig<'_>) -> String {
        self.base_override
            .clone()
            .unwrap_or_else(|| config.server().base_url().to_string())
    }

    fn override_or(&self, default: &'static str) -> String {
        self.base_override
            .clone()
            .unwrap_or_else(|| default.to_string())
    }

    /// Send a review invitation for an order.
    ///
    /// `product_invite` selects the platform's product-only flow; combined
    /// shop-and-product invitations send `false` together with product codes.
    ///
    /// # Errors
    ///
    /// [`ApiFailure::Disabled`] or [`ApiFailure::MissingToken`] before any
    /// network I/O; otherwise the classified transport/protocol/upstream
    /// failure.
    #[instrument(skip(self, payload), fields(reference = %payload.reference_code, scope = %scope))]
    pub async fn send_invitation(
        &self,
        payload: &InvitationPayload,
        scope: StoreScope,
        product_invite: bool,
    ) -> Result<InvitationReceipt, ApiFailure> {
        let config = self.scoped(scope);

        if !config.enabled() || !config.invitations_enabled() {
            return Err(ApiFailure::Disabled);
        }

        let token = config.api_token().ok_or_else(|| {
            error!(email = %payload.invite_email, "missing API token for invitation");
            ApiFailure::MissingToken
        })?;

        #[derive(Serialize)]
        struct InvitationRequest<'a> {
            #[serde(flatten)]
            payload: &'a InvitationPayload,
            product_invite: bool,
        }

        let url = format!("{}/v1/invite/external", self.base_url(&config));
        let product_count = payload.product_code.as_ref().map_or(0, Vec::len);
        info!(
            email = %payload.invite_email,
            product_invite,
            product_count,
            delay = payload.delay,
            language = %payload.language,
            "sending invitation request"
        );

        let body = InvitationRequest {
            payload,
            product_invite,
        };
        let response = self
            .execute(self.http.post(&url).timeout(WRITE_TIMEOUT).json(&body), &token)
            .await
            .inspect_err(|failure| {
                error!(email = %payload.invite_email, code = failure.code(), "invitation failed");
            })?;

        info!(email = %payload.invite_email, "invitation sent successfully");
        Ok(InvitationReceipt {
            message: "Invitation sent successfully".to_string(),
            response,
        })
    }

    /// Upsert a single product.
    ///
    /// # Errors
    ///
    /// Same classification as [`Self::send_invitation`], gated on the module
    /// being enabled rather than invitations.
    #[instrument(skip(self, payload), fields(product = %payload.product_code, scope = %scope))]
    pub async fn sync_product(
        &self,
        payload: &ProductPayload,
        scope: StoreScope,
    ) -> Result<(), ApiFailure> {
        let config = self.scoped(scope);

        if !config.enabled() {
            debug!("product sync skipped, integration disabled");
            return Err(ApiFailure::Disabled);
        }

        let token = config.api_token().ok_or_else(|| {
            error!("missing API token for product sync");
            ApiFailure::MissingToken
        })?;

        let url = format!("{}/v1/location/product/external", self.base_url(&config));
        self.execute(self.http.put(&url).timeout(WRITE_TIMEOUT).json(payload), &token)
            .await
            .inspect_err(|failure| {
                error!(code = failure.code(), "product sync failed");
            })?;

        info!("product synced successfully");
        Ok(())
    }

    /// Upsert one pre-chunked batch of products in a single request.
    ///
    /// The bulk endpoint reports no per-item results: any error marks the
    /// whole batch failed. Chunking and inter-batch pacing are the caller's
    /// job.
    #[instrument(skip(self, payloads), fields(count = payloads.len(), scope = %scope))]
    pub async fn sync_products_bulk(
        &self,
        payloads: &[ProductPayload],
        scope: StoreScope,
    ) -> BatchOutcome {
        if payloads.is_empty() {
            warn!("empty product batch for bulk sync");
            return BatchOutcome::default();
        }

        let config = self.scoped(scope);
        if !config.enabled() {
            debug!("bulk product sync skipped, integration disabled");
            return BatchOutcome::all_failed(payloads.len(), "API disabled");
        }

        let Some(token) = config.api_token() else {
            error!("missing API token for bulk product sync");
            return BatchOutcome::all_failed(payloads.len(), "Missing API token");
        };

        #[derive(Serialize)]
        struct BulkRequest<'a> {
            location_id: String,
            products: &'a [ProductPayload],
        }

        let body = BulkRequest {
            location_id: config.location_id().unwrap_or_default(),
            products: payloads,
        };
        let url = format!("{}/v1/location/product/external/bulk", self.base_url(&config));

        match self
            .execute(self.http.put(&url).timeout(BULK_TIMEOUT).json(&body), &token)
            .await
        {
            Ok(_) => {
                info!(count = payloads.len(), "bulk products synced successfully");
                BatchOutcome::all_synced(payloads.len())
            }
            Err(ApiFailure::Transport(message)) => {
                error!(%message, "bulk product sync transport failure");
                BatchOutcome::all_failed(payloads.len(), format!("cURL request failed: {message}"))
            }
            Err(ApiFailure::InvalidJson(message)) => {
                error!(%message, "bulk product sync returned invalid JSON");
                BatchOutcome::all_failed(payloads.len(), format!("Invalid JSON response: {message}"))
            }
            Err(ApiFailure::Upstream { code, message, .. }) => {
                error!(%code, %message, "bulk product sync rejected");
                BatchOutcome::all_failed(payloads.len(), format!("{code}: {message}"))
            }
            Err(failure) => BatchOutcome::all_failed(payloads.len(), failure.to_string()),
        }
    }

    /// Read the shop-level review statistics.
    ///
    /// # Errors
    ///
    /// Configuration failures before any I/O, classified failures after.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn shop_statistics(&self, scope: StoreScope) -> Result<serde_json::Value, ApiFailure> {
        let config = self.scoped(scope);
        if !config.enabled() {
            return Err(ApiFailure::Disabled);
        }
        let location_id = config.location_id().ok_or(ApiFailure::MissingLocationId)?;
        let token = config.api_token().ok_or(ApiFailure::MissingToken)?;

        let url = format!(
            "{}/v1/publication/review/external/location/statistics?locationId={location_id}",
            self.base_url(&config)
        );
        self.execute(self.http.get(&url).timeout(READ_TIMEOUT), &token)
            .await
    }

    /// Read the review statistics for one product.
    ///
    /// # Errors
    ///
    /// Configuration failures before any I/O, classified failures after.
    #[instrument(skip(self), fields(product = %product_code, scope = %scope))]
    pub async fn product_statistics(
        &self,
        product_code: &str,
        scope: StoreScope,
    ) -> Result<serde_json::Value, ApiFailure> {
        let config = self.scoped(scope);
        if !config.enabled() {
            return Err(ApiFailure::Disabled);
        }
        let location_id = config.location_id().ok_or(ApiFailure::MissingLocationId)?;
        let token = config.api_token().ok_or(ApiFailure::MissingToken)?;

        let url = format!(
            "{}/v1/publication/product/review/external?locationId={location_id}&productCode={}",
            self.base_url(&config),
            urlencoding::encode(product_code)
        );
        self.execute(self.http.get(&url).timeout(READ_TIMEOUT), &token)
            .await
    }

    /// Issue a request and classify the response.
    ///
    /// The platform signals business errors via an `errorCode` field even on
    /// HTTP 200, so classification reads the body rather than the status.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        token: &SecretString,
    ) -> Result<serde_json::Value, ApiFailure> {
        let response = request
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;
        debug!(status = %status, length = body.len(), "received response");

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiFailure::InvalidJson(e.to_string()))?;

        if let Some(code_value) = value.get("errorCode") {
            let code = code_value
                .as_str()
                .map_or_else(|| code_value.to_string(), String::from);
            let message = value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(&code)
                .to_string();
            return Err(ApiFailure::Upstream {
                code,
                message,
                response: value,
            });
        }

        Ok(value)
    }
}
