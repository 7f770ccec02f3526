//! The tile store adapter.
//!
//! `TileStoreAdapter` owns a connection to a remote document store and
//! translates tile-store operations into document operations: coordinates
//! become document identifiers, tile payloads become base64 document
//! bodies, and the tileset metadata lives under the reserved `"info"`
//! identifier.
//!
//! # Lifecycle
//!
//! ```ignore
//! use tilestash::TileStoreAdapter;
//!
//! let adapter = TileStoreAdapter::open("tilestash://?host=localhost:9200&index=tiles")?
//!     .init()
//!     .await?;
//! adapter.put_tile(0, 0, 0, Some(tile_bytes)).await?;
//! let mut adapter = adapter;
//! adapter.close().await?;
//! ```
//!
//! # Batching
//!
//! Nested `start_writing()`/`stop_writing()` calls gate a pending-write
//! buffer. While the depth is above zero and a `maxBatchSize` threshold is
//! configured, tile upserts accumulate instead of being sent; the buffer
//! drains as a single bulk submission when it reaches the threshold, on
//! every `stop_writing()`, and on `close()`. Deletes and info writes are
//! never buffered.
//!
//! The adapter imposes no internal ordering across concurrent calls; the
//! depth counter assumes a single sequential writer, and concurrent writes
//! to the same coordinate get last-writer-wins semantics from the store.

mod request;

pub use request::{GetRequest, GetResponse, TileHeaders, TILE_HEADERS};

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use parking_lot::Mutex;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{ConfigError, StoreConfig};
use crate::coord::{TileCoord, INFO_DOC_ID};
use crate::store::{BulkOp, DocumentBody, DocumentStore, HttpDocumentStore, StoreError};

/// World bounds advertised by the synthesized default info document.
pub const WORLD_BOUNDS: &str = "-180,-85.0511,180,85.0511";

/// Errors surfaced by adapter operations.
#[derive(Debug, Error)]
pub enum TileError {
    /// The requested tile does not exist (genuine miss or out-of-range
    /// zoom). A normal negative result, not a system fault.
    #[error("tile does not exist")]
    NoTile,

    /// Unsupported `type` discriminator in a read request.
    #[error("unknown request type {0}")]
    UnknownRequestType(String),

    /// A read request was structurally invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A write was attempted outside the configured zoom bounds.
    #[error("this source cannot save zoom {zoom}, because its configured for zooms {min}..{max}")]
    ZoomOutOfRange { zoom: u8, min: u8, max: u8 },

    /// `stop_writing()` without a matching `start_writing()`.
    #[error("stopWriting() called more times than startWriting()")]
    ImbalancedWriteCalls,

    /// The adapter was used after `close()`.
    #[error("adapter is closed")]
    Closed,

    /// A stored document body could not be decoded.
    #[error("invalid stored payload: {0}")]
    InvalidPayload(String),

    /// No opener registered for a URI scheme.
    #[error("no handler registered for protocol '{0}'")]
    UnknownProtocol(String),

    /// Transport-level store failure, surfaced unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed connection descriptor (registry open path).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TileError {
    /// Whether this error is the domain "no tile" miss signal.
    pub fn is_no_tile(&self) -> bool {
        matches!(self, Self::NoTile)
    }
}

/// Tile storage adapter backed by a remote document store.
pub struct TileStoreAdapter {
    config: StoreConfig,
    /// Released on `close()`; operations afterwards fail with `Closed`.
    store: Option<Arc<dyn DocumentStore>>,
    /// Nested `start_writing()` calls not yet matched by `stop_writing()`.
    batch_depth: AtomicU32,
    /// Writes accepted while batching is active but not yet flushed.
    pending: Mutex<Vec<BulkOp>>,
}

impl fmt::Debug for TileStoreAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The store handle is a trait object, so derive is unavailable.
        f.debug_struct("TileStoreAdapter")
            .field("config", &self.config)
            .field("closed", &self.store.is_none())
            .field("batch_depth", &self.batch_depth.load(Ordering::Relaxed))
            .finish()
    }
}

impl TileStoreAdapter {
    /// Create an adapter over an existing store.
    pub fn new(config: StoreConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store: Some(store),
            batch_depth: AtomicU32::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Parse a connection descriptor and build an adapter over an HTTP
    /// document store. Does not verify connectivity; call [`Self::init`].
    pub fn open(descriptor: &str) -> Result<Self, ConfigError> {
        let config = StoreConfig::from_uri(descriptor)?;
        let store = HttpDocumentStore::new(&config)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Probe the store for liveness.
    ///
    /// Must succeed before reads or writes are attempted. Consumes and
    /// returns the adapter to support fluent chaining after `open()`.
    pub async fn init(self) -> Result<Self, TileError> {
        self.store()?.ping().await?;
        Ok(self)
    }

    /// Adapter configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether `close()` has released the store handle.
    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    fn store(&self) -> Result<&Arc<dyn DocumentStore>, TileError> {
        self.store.as_ref().ok_or(TileError::Closed)
    }

    fn in_zoom_bounds(&self, z: u8) -> bool {
        z >= self.config.minzoom && z <= self.config.maxzoom
    }

    /// Serve a read request.
    ///
    /// # Errors
    ///
    /// - [`TileError::NoTile`] for a genuine miss or an out-of-range zoom
    ///   (the two are indistinguishable to callers by design)
    /// - [`TileError::Store`] for any other store failure, unmodified
    pub async fn get(&self, request: GetRequest) -> Result<GetResponse, TileError> {
        match request {
            GetRequest::Tile { z, x, y } => {
                if !self.in_zoom_bounds(z) {
                    return Err(TileError::NoTile);
                }
                let id = TileCoord::new(z, x, y).doc_id();
                let body = self.store()?.get(&id).await?.ok_or(TileError::NoTile)?;
                let data = BASE64
                    .decode(body.data.as_bytes())
                    .map_err(|e| TileError::InvalidPayload(e.to_string()))?;
                Ok(GetResponse::Tile {
                    data,
                    headers: TILE_HEADERS,
                })
            }
            GetRequest::Info => match self.store()?.get(INFO_DOC_ID).await? {
                Some(body) => {
                    let raw = BASE64
                        .decode(body.data.as_bytes())
                        .map_err(|e| TileError::InvalidPayload(e.to_string()))?;
                    let data: Value = serde_json::from_slice(&raw)
                        .map_err(|e| TileError::InvalidPayload(e.to_string()))?;
                    Ok(GetResponse::Info { data })
                }
                None => Ok(GetResponse::Info {
                    data: self.default_info(),
                }),
            },
        }
    }

    /// Default tileset descriptor returned when no info document exists.
    fn default_info(&self) -> Value {
        json!({
            "tilejson": "2.1.0",
            "name": format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            "bounds": WORLD_BOUNDS,
            "minzoom": self.config.minzoom,
            "maxzoom": self.config.maxzoom,
        })
    }

    /// Store, replace or delete a tile.
    ///
    /// A `None` or empty payload deletes the document (idempotent).
    /// Non-empty payloads are base64-encoded and upserted, routed through
    /// the batch buffer while batching is active.
    ///
    /// # Errors
    ///
    /// [`TileError::ZoomOutOfRange`] if `z` is outside the configured
    /// bounds; checked before any network interaction.
    pub async fn put_tile(
        &self,
        z: u8,
        x: u32,
        y: u32,
        tile: Option<Vec<u8>>,
    ) -> Result<(), TileError> {
        if !self.in_zoom_bounds(z) {
            return Err(TileError::ZoomOutOfRange {
                zoom: z,
                min: self.config.minzoom,
                max: self.config.maxzoom,
            });
        }

        let id = TileCoord::new(z, x, y).doc_id();
        match tile {
            Some(data) if !data.is_empty() => self.write_doc(id, &data, true).await,
            _ => {
                self.store()?.delete(&id).await?;
                Ok(())
            }
        }
    }

    /// Store the tileset metadata document.
    ///
    /// Never zoom-checked and never batched.
    pub async fn put_info(&self, info: &Value) -> Result<(), TileError> {
        let bytes = serde_json::to_vec(info)
            .map_err(|e| TileError::InvalidPayload(e.to_string()))?;
        self.write_doc(INFO_DOC_ID.to_string(), &bytes, false).await
    }

    async fn write_doc(&self, id: String, data: &[u8], batchable: bool) -> Result<(), TileError> {
        let store = Arc::clone(self.store()?);
        let body = DocumentBody {
            data: BASE64.encode(data),
        };

        if batchable && self.batch_depth.load(Ordering::Relaxed) > 0 {
            if let Some(threshold) = self.config.max_batch_size {
                let flush_now = {
                    let mut pending = self.pending.lock();
                    pending.push(BulkOp::Put { id, body });
                    pending.len() >= threshold
                };
                if flush_now {
                    self.flush().await?;
                }
                return Ok(());
            }
        }

        store.put(&id, body).await?;
        Ok(())
    }

    /// Enter batching mode; stacks on repeated calls.
    pub fn start_writing(&self) {
        self.batch_depth.fetch_add(1, Ordering::Relaxed);
    }

    /// Leave one level of batching mode, then attempt a flush.
    ///
    /// # Errors
    ///
    /// [`TileError::ImbalancedWriteCalls`] if no `start_writing()` call is
    /// outstanding.
    pub async fn stop_writing(&self) -> Result<(), TileError> {
        self.batch_depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |depth| {
                depth.checked_sub(1)
            })
            .map_err(|_| TileError::ImbalancedWriteCalls)?;
        self.flush().await
    }

    /// Drain pending writes as a single bulk submission.
    ///
    /// The buffer is empty after this call whether or not it succeeds;
    /// on failure the store reports the whole batch as failed and the
    /// caller sees the error (writes are never silently dropped).
    pub async fn flush(&self) -> Result<(), TileError> {
        let ops: Vec<BulkOp> = std::mem::take(&mut *self.pending.lock());
        if ops.is_empty() {
            return Ok(());
        }
        self.store()?.bulk(ops).await?;
        Ok(())
    }

    /// Flush outstanding batched writes and release the store handle.
    ///
    /// Closing an already-closed adapter is a no-op.
    pub async fn close(&mut self) -> Result<(), TileError> {
        if self.store.is_none() {
            return Ok(());
        }
        if self.batch_depth.load(Ordering::Relaxed) > 0 && self.config.max_batch_size.is_some()
        {
            self.flush().await?;
        }
        self.store = None;
        self.batch_depth.store(0, Ordering::Relaxed);
        Ok(())
    }
}
