//! Tilestash - map tile storage on a remote document store
//!
//! This library implements a tile-storage backend adapter: a uniform
//! get/put/delete contract for map tiles addressed by zoom/x/y, plus a
//! single JSON "info" metadata document per tileset, all persisted in a
//! remote keyed-JSON document store.
//!
//! The adapter is configured from a connection URI, registers itself with
//! a host framework's protocol table, and speaks to the store through the
//! [`store::DocumentStore`] seam (HTTP in production, in-memory for tests
//! and local tooling).

pub mod adapter;
pub mod config;
pub mod coord;
pub mod registry;
pub mod store;

pub use adapter::{
    GetRequest, GetResponse, TileError, TileHeaders, TileStoreAdapter, TILE_HEADERS, WORLD_BOUNDS,
};
pub use config::{ConfigError, StoreConfig};
pub use coord::{TileCoord, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, INFO_DOC_ID};
pub use registry::{register_protocols, Registry, MEMORY_PROTOCOL, PROTOCOL};
pub use store::{
    BulkOp, DocumentBody, DocumentStore, HttpDocumentStore, MemoryDocumentStore, StoreError,
};
