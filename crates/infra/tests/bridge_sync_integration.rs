//! End-to-end pull sync against a mock EXT server
//!
//! Exercises the whole chain: session login, paginated fetches through the
//! request client, field mapping, and local upserts.

use serde_json::json;
use steward_core::testing::{
    MemoryBuyerRepository, MemoryProgramRepository, MemoryPropertyRepository,
};
use steward_core::SyncReconciler;
use steward_domain::SyncOutcome;
use wiremock::matchers::{method, path, query_param};
use wiremock::Mock;

mod support;
use support::{envelope_err, envelope_ok, ext_property, TestBridge, PROPERTIES_RECORDS_PATH};

struct LocalStores {
    properties: std::sync::Arc<MemoryPropertyRepository>,
    buyers: std::sync::Arc<MemoryBuyerRepository>,
}

fn reconciler(bridge: &TestBridge) -> (SyncReconciler, LocalStores) {
    let properties = MemoryPropertyRepository::new();
    let buyers = MemoryBuyerRepository::new();
    let reconciler = SyncReconciler::new(
        bridge.client.clone(),
        properties.clone(),
        buyers.clone(),
        MemoryProgramRepository::standard(),
    );
    (reconciler, LocalStores { properties, buyers })
}

#[tokio::test]
async fn full_sync_pages_through_ext_and_upserts_locally() {
    let bridge = TestBridge::start().await;

    // Page size 2: a full first page, then a short second page
    Mock::given(method("GET"))
        .and(path(PROPERTIES_RECORDS_PATH))
        .and(query_param("_offset", "1"))
        .respond_with(envelope_ok(json!({
            "data": [
                ext_property("1", "P-001", Some("john@example.org")),
                ext_property("2", "P-002", Some("mary@example.org"))
            ]
        })))
        .expect(1)
        .mount(&bridge.server)
        .await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES_RECORDS_PATH))
        .and(query_param("_offset", "3"))
        .respond_with(envelope_ok(json!({
            "data": [ext_property("3", "P-003", None)]
        })))
        .expect(1)
        .mount(&bridge.server)
        .await;

    let (reconciler, stores) = reconciler(&bridge);
    let outcome = reconciler.sync(Some(2), false).await.expect("sync should succeed");

    match outcome {
        SyncOutcome::Completed(stats) => {
            assert_eq!(stats.synced, 3);
            assert_eq!(stats.created, 3);
            assert_eq!(stats.updated, 0);
            assert_eq!(stats.skipped, 0);
            assert!(stats.errors.is_empty());
        }
        SyncOutcome::Preview(_) => panic!("expected a completed sync"),
    }

    assert_eq!(stores.properties.len(), 3);
    assert_eq!(stores.buyers.len(), 3);

    let property = stores
        .properties
        .all()
        .into_iter()
        .find(|p| p.parcel_id == "P-001")
        .expect("P-001 upserted");
    assert_eq!(property.address, "P-001 Main St");
    assert_eq!(property.status, "In Compliance");
    assert!(property.is_occupied);
    assert!(!property.is_insured);
}

#[tokio::test]
async fn not_found_page_ends_the_sync_cleanly() {
    let bridge = TestBridge::start().await;

    Mock::given(method("GET"))
        .and(path(PROPERTIES_RECORDS_PATH))
        .respond_with(envelope_err("401", "No records match the request"))
        .expect(1)
        .mount(&bridge.server)
        .await;

    let (reconciler, stores) = reconciler(&bridge);
    let outcome = reconciler.sync(None, false).await.expect("empty dataset is not an error");

    match outcome {
        SyncOutcome::Completed(stats) => {
            assert_eq!(stats.synced, 0);
            assert!(stats.errors.is_empty());
        }
        SyncOutcome::Preview(_) => panic!("expected a completed sync"),
    }
    assert!(stores.properties.is_empty());
}

#[tokio::test]
async fn dry_run_previews_without_mutating() {
    let bridge = TestBridge::start().await;

    Mock::given(method("GET"))
        .and(path(PROPERTIES_RECORDS_PATH))
        .respond_with(envelope_ok(json!({
            "data": [
                ext_property("1", "P-001", Some("john@example.org")),
                ext_property("2", "P-002", None)
            ]
        })))
        .mount(&bridge.server)
        .await;

    let (reconciler, stores) = reconciler(&bridge);
    let outcome = reconciler.sync(None, true).await.expect("dry run should succeed");

    match outcome {
        SyncOutcome::Preview(preview) => {
            assert_eq!(preview.len(), 2);
            assert_eq!(preview[0].property["parcel_id"], json!("P-001"));
            assert_eq!(preview[0].buyer["full_name"], json!("Smith, John"));
        }
        SyncOutcome::Completed(_) => panic!("expected a preview"),
    }

    assert!(stores.properties.is_empty());
    assert!(stores.buyers.is_empty());
}

#[tokio::test]
async fn second_sync_updates_instead_of_duplicating() {
    let bridge = TestBridge::start().await;

    Mock::given(method("GET"))
        .and(path(PROPERTIES_RECORDS_PATH))
        .respond_with(envelope_ok(json!({
            "data": [ext_property("1", "P-001", Some("john@example.org"))]
        })))
        .mount(&bridge.server)
        .await;

    let (reconciler, stores) = reconciler(&bridge);

    let first = reconciler.sync(None, false).await.expect("first sync");
    let second = reconciler.sync(None, false).await.expect("second sync");

    match (first, second) {
        (SyncOutcome::Completed(a), SyncOutcome::Completed(b)) => {
            assert_eq!(a.created, 1);
            assert_eq!(b.created, 0);
            assert_eq!(b.updated, 1);
        }
        _ => panic!("expected completed syncs"),
    }
    assert_eq!(stores.properties.len(), 1);
    // Buyer identity held by email across runs
    assert_eq!(stores.buyers.len(), 1);
}
