mod common;

use std::sync::Arc;

use common::{LOCATION, SCOPE, TOKEN, enabled_config, product};
use kiyoh_sync::KiyohClient;
use kiyoh_sync::client::ApiFailure;
use kiyoh_sync::config::{MemoryConfig, paths};
use kiyoh_sync::payload::{InvitationPayload, build_product_payload};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(config: MemoryConfig, server: &MockServer) -> KiyohClient {
    KiyohClient::new(Arc::new(config)).with_base_url(server.uri())
}

fn invitation_payload() -> InvitationPayload {
    InvitationPayload {
        location_id: LOCATION.to_string(),
        invite_email: "jo@example.com".to_string(),
        delay: 7,
        language: "nl".to_string(),
        first_name: Some("Jo".to_string()),
        last_name: Some("Doe".to_string()),
        reference_code: "100000042".to_string(),
        product_code: None,
    }
}

// ── send_invitation ─────────────────────────────────────────────

#[tokio::test]
async fn invitation_success_carries_token_and_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/invite/external"))
        .and(header("X-Publication-Api-Token", TOKEN))
        .and(body_partial_json(json!({
            "invite_email": "jo@example.com",
            "product_invite": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"inviteId": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(enabled_config(), &server);
    let receipt = client
        .send_invitation(&invitation_payload(), SCOPE, false)
        .await
        .expect("invitation should succeed");
    assert_eq!(receipt.response["inviteId"], "abc");
}

#[tokio::test]
async fn invitation_surfaces_upstream_error_code_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/invite/external"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "PRODUCT_NOT_FOUND",
            "message": "Product SKU1 is not known"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(enabled_config(), &server);
    let failure = client
        .send_invitation(&invitation_payload(), SCOPE, true)
        .await
        .expect_err("upstream error expected");

    assert_eq!(failure.code(), "PRODUCT_NOT_FOUND");
    assert!(failure.is_product_related());
    match failure {
        ApiFailure::Upstream { message, .. } => {
            assert_eq!(message, "Product SKU1 is not known");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn invitation_non_json_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/invite/external"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&server)
        .await;

    let client = client(enabled_config(), &server);
    let failure = client
        .send_invitation(&invitation_payload(), SCOPE, false)
        .await
        .expect_err("invalid JSON expected");
    assert_eq!(failure.code(), "INVALID_JSON");
    assert!(!failure.is_product_related());
}

#[tokio::test]
async fn invitation_missing_token_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = MemoryConfig::new()
        .with(SCOPE, paths::ENABLED, "1")
        .with(SCOPE, paths::INVITATIONS_ENABLED, "1");

    let client = client(config, &server);
    let failure = client
        .send_invitation(&invitation_payload(), SCOPE, false)
        .await
        .expect_err("missing token expected");
    assert_eq!(failure.code(), "MISSING_TOKEN");
}

#[tokio::test]
async fn invitation_disabled_scope_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = MemoryConfig::new().with(SCOPE, paths::ENABLED, "1");
    let client = client(config, &server);
    let failure = client
        .send_invitation(&invitation_payload(), SCOPE, false)
        .await
        .expect_err("disabled expected");
    assert_eq!(failure.code(), "DISABLED");
}

// ── product sync ────────────────────────────────────────────────

#[tokio::test]
async fn single_product_upsert_uses_put() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/location/product/external"))
        .and(header("X-Publication-Api-Token", TOKEN))
        .and(body_partial_json(json!({
            "product_code": "SKU1",
            "active": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = build_product_payload(&product("SKU1"), LOCATION).expect("payload");
    let client = client(enabled_config(), &server);
    client
        .sync_product(&payload, SCOPE)
        .await
        .expect("sync should succeed");
}

#[tokio::test]
async fn bulk_sync_sends_single_request_with_location() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/location/product/external/bulk"))
        .and(body_partial_json(json!({"location_id": LOCATION})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let payloads: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|sku| build_product_payload(&product(sku), LOCATION).expect("payload"))
        .collect();

    let client = client(enabled_config(), &server);
    let outcome = client.sync_products_bulk(&payloads, SCOPE).await;
    assert_eq!(outcome.success_count, 3);
    assert_eq!(outcome.failed_count, 0);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn bulk_sync_error_fails_entire_batch() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/location/product/external/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "INVALID_LOCATION_ID",
            "message": "Unknown location"
        })))
        .mount(&server)
        .await;

    let payloads: Vec<_> = ["A", "B"]
        .iter()
        .map(|sku| build_product_payload(&product(sku), LOCATION).expect("payload"))
        .collect();

    let client = client(enabled_config(), &server);
    let outcome = client.sync_products_bulk(&payloads, SCOPE).await;
    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.failed_count, 2);
    assert_eq!(
        outcome.errors,
        vec!["INVALID_LOCATION_ID: Unknown location".to_string()]
    );
}

#[tokio::test]
async fn bulk_sync_empty_batch_is_a_no_op() {
    let server = MockServer::start().await;
    let client = client(enabled_config(), &server);
    let outcome = client.sync_products_bulk(&[], SCOPE).await;
    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.failed_count, 0);
}

// ── statistics ──────────────────────────────────────────────────

#[tokio::test]
async fn shop_statistics_reads_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/publication/review/external/location/statistics"))
        .and(query_param("locationId", LOCATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locationName": "Test Shop",
            "averageRating": 8.7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(enabled_config(), &server);
    let stats = client.shop_statistics(SCOPE).await.expect("stats");
    assert_eq!(stats["locationName"], "Test Shop");
}

#[tokio::test]
async fn product_statistics_pass_product_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/publication/product/review/external"))
        .and(query_param("productCode", "SKU 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reviews": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(enabled_config(), &server);
    client
        .product_statistics("SKU 1", SCOPE)
        .await
        .expect("stats");
}

#[tokio::test]
async fn statistics_require_location_id() {
    let server = MockServer::start().await;
    let config = MemoryConfig::new()
        .with(SCOPE, paths::ENABLED, "1")
        .with(SCOPE, paths::API_TOKEN, TOKEN);
    let client = client(config, &server);
    let failure = client.shop_statistics(SCOPE).await.expect_err("failure");
    assert_eq!(failure.code(), "MISSING_LOCATION_ID");
}

// ── credential validation ───────────────────────────────────────

#[tokio::test]
async fn validate_credentials_accepts_known_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/publication/review/external/location/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"locationName": "Shop"})))
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_credentials("kiyoh.com", &SecretString::from(TOKEN.to_string()), LOCATION)
        .await;
    assert!(outcome.success);
}

#[tokio::test]
async fn validate_credentials_maps_auth_status_to_invalid_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_credentials("kiyoh.com", &SecretString::from("bad".to_string()), LOCATION)
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid API token");
}

#[tokio::test]
async fn validate_credentials_location_error_is_specific() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "location not found"
        })))
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_credentials("kiyoh.com", &SecretString::from(TOKEN.to_string()), "999")
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid Location ID");
}

#[tokio::test]
async fn validate_credentials_requires_location_name_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"something": "else"})))
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_credentials("kiyoh.com", &SecretString::from(TOKEN.to_string()), LOCATION)
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Location not found - check Location ID");
}

#[tokio::test]
async fn validate_legacy_credentials_checks_company_element() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xml/recent_company_reviews.xml"))
        .and(query_param("connectorcode", "conn"))
        .and(query_param("company_id", "77"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<reviews><company><name>Shop</name></company></reviews>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_legacy_credentials("kiyoh.nl", "conn", "77")
        .await;
    assert!(outcome.success);
}

#[tokio::test]
async fn validate_legacy_credentials_surfaces_error_element() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<reviews><error>Invalid connector code</error></reviews>"),
        )
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_legacy_credentials("kiyoh.nl", "bad", "77")
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid connector code");
}

#[tokio::test]
async fn validate_legacy_credentials_rejects_non_xml() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let client = client(MemoryConfig::new(), &server);
    let outcome = client
        .validate_legacy_credentials("kiyoh.nl", "conn", "77")
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid XML response");
}
