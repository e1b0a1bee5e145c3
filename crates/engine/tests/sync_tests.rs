mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{BrokenCatalog, RawCatalog, SCOPE, enabled_config, products};
use kiyoh_sync::catalog::MemoryCatalog;
use kiyoh_sync::client::KiyohClient;
use kiyoh_sync::config::{MemoryConfig, paths};
use kiyoh_sync::sync::{
    InitialSyncJob, MemorySyncState, ProductSyncService, SyncProgress, SyncStateStore,
};
use kiyoh_sync_core::BatchProgress;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BULK_PATH: &str = "/v1/location/product/external/bulk";

fn service(
    config: MemoryConfig,
    catalog: impl kiyoh_sync::catalog::ProductCatalog + 'static,
    server: &MockServer,
) -> ProductSyncService {
    let config = Arc::new(config);
    let client = KiyohClient::new(config.clone()).with_base_url(server.uri());
    ProductSyncService::new(config, Arc::new(catalog), client)
        .with_batch_size(200)
        .with_batch_delay(Duration::ZERO)
}

async fn mount_bulk_ok(server: &MockServer, expected: u64) {
    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(expected)
        .mount(server)
        .await;
}

// ── batching ────────────────────────────────────────────────────

#[tokio::test]
async fn sync_450_products_issues_three_batches() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 3).await;

    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(450)),
        &server,
    );
    let report = service.sync_all_products(SCOPE, None).await;

    assert!(report.success);
    assert_eq!(report.total, 450);
    assert_eq!(report.total_batches, 3);
    assert_eq!(report.synced, 450);
    assert_eq!(report.failed, 0);
    assert_eq!(report.message, "Bulk sync completed: 450 synced, 0 failed");
}

#[tokio::test]
async fn rate_limit_pauses_before_every_batch_after_the_first() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 3).await;

    let delay = Duration::from_millis(150);
    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(450)),
        &server,
    )
    .with_batch_delay(delay);

    let started = Instant::now();
    let report = service.sync_all_products(SCOPE, None).await;
    let elapsed = started.elapsed();

    assert_eq!(report.total_batches, 3);
    // Two pauses (before batch 2 and batch 3), none before batch 1.
    assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn single_batch_run_does_not_pause() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 1).await;

    let delay = Duration::from_millis(200);
    let service = service(enabled_config(), MemoryCatalog::new(products(50)), &server)
        .with_batch_delay(delay);

    let started = Instant::now();
    let report = service.sync_all_products(SCOPE, None).await;

    assert_eq!(report.total_batches, 1);
    assert!(started.elapsed() < delay, "no pause expected before batch 1");
}

// ── short-circuits ──────────────────────────────────────────────

#[tokio::test]
async fn disabled_scope_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = MemoryConfig::new().with(SCOPE, paths::ENABLED, "1");
    let service = service(config, MemoryCatalog::new(products(10)), &server);
    let report = service.sync_all_products(SCOPE, None).await;

    assert!(!report.success);
    assert_eq!(report.message, "Product sync is disabled");
    assert_eq!(report.synced, 0);
}

#[tokio::test]
async fn empty_catalog_is_a_successful_no_op() {
    let server = MockServer::start().await;
    let service = service(enabled_config(), MemoryCatalog::new(Vec::new()), &server);
    let report = service.sync_all_products(SCOPE, None).await;

    assert!(report.success);
    assert_eq!(report.message, "No products found to sync");
    assert_eq!(report.total, 0);
}

#[tokio::test]
async fn catalog_failure_before_batching_is_run_fatal() {
    let server = MockServer::start().await;
    let service = service(enabled_config(), BrokenCatalog, &server);
    let report = service.sync_all_products(SCOPE, None).await;

    assert!(!report.success);
    assert!(report.message.starts_with("Critical error:"));
    assert_eq!(report.errors.len(), 1);
}

// ── eligibility re-check ────────────────────────────────────────

#[tokio::test]
async fn eligibility_is_reapplied_per_product_beyond_query_filter() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 1).await;

    // RawCatalog ignores the query-level exclusions, so only the per-product
    // re-check keeps SKU0002 out of the batch.
    let config = enabled_config().with(SCOPE, paths::EXCLUDED_PRODUCT_CODES, "SKU0002");
    let service = service(config, RawCatalog(products(3)), &server);
    let report = service.sync_all_products(SCOPE, None).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.synced, 2);
    assert_eq!(report.failed, 0);
}

// ── batch-local failure ─────────────────────────────────────────

#[tokio::test]
async fn failed_batch_does_not_stop_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "TOO_MANY_PRODUCTS",
            "message": "Batch rejected"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_bulk_ok(&server, 2).await;

    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(450)),
        &server,
    );
    let report = service.sync_all_products(SCOPE, None).await;

    // First batch of 200 rejected wholesale, remaining 250 accepted.
    assert!(report.success);
    assert_eq!(report.failed, 200);
    assert_eq!(report.synced, 250);
    assert_eq!(report.errors, vec!["TOO_MANY_PRODUCTS: Batch rejected".to_string()]);
}

// ── idempotence ─────────────────────────────────────────────────

#[tokio::test]
async fn repeated_runs_yield_identical_reports() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 4).await;

    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(250)),
        &server,
    );
    let first = service.sync_all_products(SCOPE, None).await;
    let second = service.sync_all_products(SCOPE, None).await;

    assert_eq!(first, second);
    assert_eq!(first.synced, 250);
}

// ── progress observer ───────────────────────────────────────────

struct Recording {
    snapshots: Vec<BatchProgress>,
    fail: bool,
}

impl SyncProgress for Recording {
    fn on_batch_complete(
        &mut self,
        progress: &BatchProgress,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.snapshots.push(progress.clone());
        if self.fail {
            return Err("observer exploded".into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn progress_reports_cumulative_counts_per_batch() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 3).await;

    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(450)),
        &server,
    );
    let mut observer = Recording {
        snapshots: Vec::new(),
        fail: false,
    };
    let report = service.sync_all_products(SCOPE, Some(&mut observer)).await;

    assert!(report.success);
    assert_eq!(observer.snapshots.len(), 3);
    let last = observer.snapshots.last().expect("three snapshots");
    assert_eq!(last.current_batch, 3);
    assert_eq!(last.total_batches, 3);
    assert_eq!(last.synced, 450);
    assert_eq!(last.batch_success, 50);
}

#[tokio::test]
async fn observer_failure_never_aborts_the_run() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 2).await;

    let service = service(
        enabled_config(),
        MemoryCatalog::new(products(300)),
        &server,
    );
    let mut observer = Recording {
        snapshots: Vec::new(),
        fail: true,
    };
    let report = service.sync_all_products(SCOPE, Some(&mut observer)).await;

    assert!(report.success);
    assert_eq!(report.synced, 300);
    // Observer was still invoked for every batch.
    assert_eq!(observer.snapshots.len(), 2);
}

// ── initial sync job ────────────────────────────────────────────

#[tokio::test]
async fn initial_sync_runs_once_and_marks_done_on_success() {
    let server = MockServer::start().await;
    mount_bulk_ok(&server, 1).await;

    let state = Arc::new(MemorySyncState::new());
    let job = InitialSyncJob::new(
        service(enabled_config(), MemoryCatalog::new(products(5)), &server),
        state.clone(),
    );

    job.run(&[SCOPE]).await;
    assert!(state.is_initial_sync_done(SCOPE));

    // Second tick: nothing left to do, the bulk mock stays at one call.
    job.run(&[SCOPE]).await;
}

#[tokio::test]
async fn initial_sync_not_marked_done_when_disabled() {
    let server = MockServer::start().await;
    let state = Arc::new(MemorySyncState::new());
    let config = MemoryConfig::new().with(SCOPE, paths::ENABLED, "1");
    let job = InitialSyncJob::new(
        service(config, MemoryCatalog::new(products(5)), &server),
        state.clone(),
    );

    job.run(&[SCOPE]).await;
    assert!(!state.is_initial_sync_done(SCOPE));
}
