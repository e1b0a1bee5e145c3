//! Credential validation against the live platform.
//!
//! Used by the host's configuration screens and the CLI before a token is
//! saved. Two generations of the API exist: the current publication API
//! (token + location id) and the legacy XML feed (connector code + company
//! id). Both checks answer with a plain [`ValidationOutcome`] rather than an
//! error, since "invalid credentials" is the expected result, not a failure.

use kiyoh_sync_core::ValidationOutcome;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{KiyohClient, READ_TIMEOUT, TOKEN_HEADER};

/// Server table for the current publication API. `newkiyoh.com` is an alias
/// kept for configurations migrated from the legacy module.
fn resolve_api_server(selector: &str) -> &'static str {
    match selector {
        "klantenvertellen.nl" => "https://www.klantenvertellen.nl",
        _ => "https://www.kiyoh.com",
    }
}

/// Server table for the legacy XML feed.
fn resolve_legacy_server(selector: &str) -> &'static str {
    match selector {
        "kiyoh.com" => "https://www.kiyoh.com",
        _ => "https://www.kiyoh.nl",
    }
}

impl KiyohClient {
    /// Validate a publication API token and location id.
    ///
    /// Probes the shop statistics endpoint: 401/403 means the token is bad, a
    /// location-flavored error code means the location id is bad, and a body
    /// without `locationName` means the location does not exist.
    #[instrument(skip(self, token), fields(server = %server, location = %location_id))]
    pub async fn validate_credentials(
        &self,
        server: &str,
        token: &SecretString,
        location_id: &str,
    ) -> ValidationOutcome {
        let base = self.override_or(resolve_api_server(server));
        let url = format!(
            "{base}/v1/publication/review/external/location/statistics?locationId={}",
            urlencoding::encode(location_id)
        );

        let response = match self
            .http_get(&url)
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => return ValidationOutcome::failed("Connection failed"),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ValidationOutcome::failed("Invalid API token");
        }
        if status != StatusCode::OK {
            return ValidationOutcome::failed(format!(
                "API request failed with HTTP {}",
                status.as_u16()
            ));
        }

        let Ok(body) = response.text().await else {
            return ValidationOutcome::failed("Connection failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
            return ValidationOutcome::failed("Invalid JSON response from API");
        };

        if let Some(code_value) = value.get("errorCode") {
            let code = code_value
                .as_str()
                .map_or_else(|| code_value.to_string(), String::from);
            if code.contains("location") || code.contains("Location") {
                return ValidationOutcome::failed("Invalid Location ID");
            }
            return ValidationOutcome::failed(code);
        }

        if value.get("locationName").is_none() {
            return ValidationOutcome::failed("Location not found - check Location ID");
        }

        ValidationOutcome::ok("Credentials validated successfully")
    }

    /// Validate legacy connector credentials against the XML review feed.
    #[instrument(skip(self, connector), fields(server = %server, company = %company_id))]
    pub async fn validate_legacy_credentials(
        &self,
        server: &str,
        connector: &str,
        company_id: &str,
    ) -> ValidationOutcome {
        let base = self.override_or(resolve_legacy_server(server));
        let url = format!(
            "{base}/xml/recent_company_reviews.xml?connectorcode={}&company_id={}",
            urlencoding::encode(connector),
            urlencoding::encode(company_id)
        );

        let response = match self.http_get(&url).send().await {
            Ok(response) => response,
            Err(_) => return ValidationOutcome::failed("Connection failed"),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return ValidationOutcome::failed(format!(
                "Invalid HTTP response: {}",
                status.as_u16()
            ));
        }

        let Ok(body) = response.text().await else {
            return ValidationOutcome::failed("Connection failed");
        };
        let Ok(document) = roxmltree::Document::parse(&body) else {
            return ValidationOutcome::failed("Invalid XML response");
        };

        if let Some(error) = document
            .descendants()
            .find(|node| node.has_tag_name("error"))
        {
            return ValidationOutcome::failed(error.text().unwrap_or("Unknown error").trim());
        }

        if !document
            .descendants()
            .any(|node| node.has_tag_name("company"))
        {
            return ValidationOutcome::failed("Invalid credentials or company not found");
        }

        ValidationOutcome::ok("Credentials validated successfully")
    }

    fn http_get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url).timeout(READ_TIMEOUT)
    }
}
