//! Integration tests for the tile store adapter.
//!
//! These tests exercise the complete adapter flow against the in-memory
//! document store:
//! - write → read round-trips, byte-exact, including binary payloads
//! - delete and miss behavior
//! - zoom-range validation on both paths
//! - info document round-trip and the synthesized default descriptor
//! - protocol registry open path
//!
//! Run with: `cargo test --test adapter_integration`

use std::sync::Arc;

use serde_json::json;

use tilestash::{
    register_protocols, GetRequest, GetResponse, MemoryDocumentStore, Registry, StoreConfig,
    TileError, TileStoreAdapter, TILE_HEADERS, WORLD_BOUNDS,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Adapter over a fresh in-memory store with the given connection URI.
fn adapter_for(uri: &str) -> TileStoreAdapter {
    let config = StoreConfig::from_uri(uri).unwrap();
    TileStoreAdapter::new(config, Arc::new(MemoryDocumentStore::new()))
}

/// Adapter with default bounds (0..22) and a typical connection
/// descriptor: `host=localhost:9200, index=tiletest`.
fn default_adapter() -> TileStoreAdapter {
    adapter_for("tilestash://?host=localhost:9200&index=tiletest")
}

/// Fetch a tile and return its payload, panicking on a miss.
async fn fetch(adapter: &TileStoreAdapter, z: u8, x: u32, y: u32) -> Vec<u8> {
    match adapter.get(GetRequest::tile(z, x, y)).await.unwrap() {
        GetResponse::Tile { data, headers } => {
            assert_eq!(headers, TILE_HEADERS);
            data
        }
        GetResponse::Info { .. } => panic!("expected a tile response"),
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_tile_roundtrip_is_byte_exact() {
    let adapter = default_adapter();

    adapter.put_tile(0, 0, 0, Some(b"abc".to_vec())).await.unwrap();
    assert_eq!(fetch(&adapter, 0, 0, 0).await, b"abc");
}

#[tokio::test]
async fn test_binary_payload_roundtrip() {
    let adapter = default_adapter();

    // Every byte value, twice, out of order: survives base64 transit.
    let mut payload: Vec<u8> = (0u8..=255).collect();
    payload.extend((0u8..=255).rev());

    adapter
        .put_tile(12, 2048, 1365, Some(payload.clone()))
        .await
        .unwrap();
    assert_eq!(fetch(&adapter, 12, 2048, 1365).await, payload);
}

#[tokio::test]
async fn test_get_before_any_write_is_no_tile() {
    let adapter = default_adapter();

    let err = adapter.get(GetRequest::tile(0, 0, 0)).await.unwrap_err();
    assert!(err.is_no_tile());
}

#[tokio::test]
async fn test_put_null_deletes_the_tile() {
    let adapter = default_adapter();

    adapter.put_tile(0, 0, 0, Some(b"abc".to_vec())).await.unwrap();
    assert_eq!(fetch(&adapter, 0, 0, 0).await, b"abc");

    adapter.put_tile(0, 0, 0, None).await.unwrap();
    let err = adapter.get(GetRequest::tile(0, 0, 0)).await.unwrap_err();
    assert!(err.is_no_tile());
}

#[tokio::test]
async fn test_put_empty_payload_deletes_the_tile() {
    let adapter = default_adapter();

    adapter.put_tile(5, 10, 20, Some(b"xyz".to_vec())).await.unwrap();
    adapter.put_tile(5, 10, 20, Some(Vec::new())).await.unwrap();

    let err = adapter.get(GetRequest::tile(5, 10, 20)).await.unwrap_err();
    assert!(err.is_no_tile());
}

#[tokio::test]
async fn test_deleting_a_missing_tile_is_not_an_error() {
    let adapter = default_adapter();
    adapter.put_tile(3, 4, 5, None).await.unwrap();
}

#[tokio::test]
async fn test_distant_coordinates_do_not_cross_contaminate() {
    let adapter = default_adapter();

    adapter.put_tile(0, 0, 0, Some(b"origin".to_vec())).await.unwrap();
    adapter
        .put_tile(22, 123_456, 654_321, Some(b"deep".to_vec()))
        .await
        .unwrap();

    assert_eq!(fetch(&adapter, 0, 0, 0).await, b"origin");
    assert_eq!(fetch(&adapter, 22, 123_456, 654_321).await, b"deep");

    // Deleting one leaves the other intact.
    adapter.put_tile(0, 0, 0, None).await.unwrap();
    assert_eq!(fetch(&adapter, 22, 123_456, 654_321).await, b"deep");
}

#[tokio::test]
async fn test_put_outside_zoom_bounds_names_zoom_and_bounds() {
    let adapter = adapter_for("tilestash://?host=h:1&index=t&minzoom=6&maxzoom=14");

    let err = adapter.put_tile(3, 0, 0, Some(b"x".to_vec())).await.unwrap_err();
    match &err {
        TileError::ZoomOutOfRange { zoom, min, max } => {
            assert_eq!((*zoom, *min, *max), (3, 6, 14));
        }
        other => panic!("expected ZoomOutOfRange, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("cannot save zoom 3"), "message: {}", message);
    assert!(message.contains("6..14"), "message: {}", message);
}

#[tokio::test]
async fn test_info_defaults_before_any_put_info() {
    let adapter = default_adapter();

    let response = adapter.get(GetRequest::Info).await.unwrap();
    let info = response.info_data().unwrap();

    assert_eq!(info["bounds"], WORLD_BOUNDS);
    assert_eq!(info["minzoom"], 0);
    assert_eq!(info["maxzoom"], 22);
    assert_eq!(info["tilejson"], "2.1.0");
}

#[tokio::test]
async fn test_info_roundtrip_returns_exactly_what_was_stored() {
    let adapter = default_adapter();

    adapter.put_info(&json!({"test": 123})).await.unwrap();

    let response = adapter.get(GetRequest::Info).await.unwrap();
    match response {
        GetResponse::Info { data } => assert_eq!(data, json!({"test": 123})),
        GetResponse::Tile { .. } => panic!("expected an info response"),
    }
}

#[tokio::test]
async fn test_untyped_request_boundary_shapes() {
    let adapter = default_adapter();
    adapter.put_tile(0, 0, 0, Some(b"abc".to_vec())).await.unwrap();

    // Absent `type` routes to tile lookup.
    let request = GetRequest::from_json(&json!({"z": 0, "x": 0, "y": 0})).unwrap();
    match adapter.get(request).await.unwrap() {
        GetResponse::Tile { data, headers } => {
            assert_eq!(data, b"abc");
            assert_eq!(headers, TILE_HEADERS);
        }
        GetResponse::Info { .. } => panic!("expected a tile response"),
    }

    // Unknown discriminators never reach the store.
    let err = GetRequest::from_json(&json!({"type": "grid", "z": 0})).unwrap_err();
    assert!(matches!(err, TileError::UnknownRequestType(_)));
}

#[tokio::test]
async fn test_full_write_session_with_batching() {
    let config = StoreConfig::from_uri(
        "tilestash://?host=localhost:9200&index=tiletest&maxBatchSize=3",
    )
    .unwrap();
    let store = Arc::new(MemoryDocumentStore::new());
    let docs: Arc<dyn tilestash::DocumentStore> = store.clone();
    let adapter = TileStoreAdapter::new(config, docs);

    adapter.start_writing();
    for x in 0..5u32 {
        adapter.put_tile(4, x, 0, Some(vec![x as u8])).await.unwrap();
    }
    adapter.stop_writing().await.unwrap();

    // Everything is durable regardless of which writes crossed the
    // threshold mid-session and which drained on stop.
    for x in 0..5u32 {
        assert_eq!(fetch(&adapter, 4, x, 0).await, vec![x as u8]);
    }
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_registry_open_and_use() {
    let mut registry = Registry::new();
    register_protocols(&mut registry);

    let mut adapter = registry.open("memory:").await.unwrap();

    adapter.put_tile(0, 0, 0, Some(b"abc".to_vec())).await.unwrap();
    assert_eq!(fetch(&adapter, 0, 0, 0).await, b"abc");

    adapter.put_tile(0, 0, 0, None).await.unwrap();
    let err = adapter.get(GetRequest::tile(0, 0, 0)).await.unwrap_err();
    assert!(err.is_no_tile());

    adapter.close().await.unwrap();
    assert!(adapter.is_closed());
}
