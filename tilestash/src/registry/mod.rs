//! Protocol registration seam.
//!
//! The host tile-serving framework discovers storage backends through a
//! protocol table mapping URI schemes to async openers. The framework
//! itself is external; this module only provides the table shape and the
//! adapter's registration entry point, so a host (or a test) can do:
//!
//! ```ignore
//! let mut registry = Registry::new();
//! tilestash::register_protocols(&mut registry);
//! let adapter = registry
//!     .open("tilestash://?host=localhost:9200&index=tiles")
//!     .await?;
//! ```
//!
//! Openers return fully initialized adapters: construction and the
//! `init()` liveness probe are chained.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{TileError, TileStoreAdapter};
use crate::config::StoreConfig;
use crate::coord::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::store::{BoxFuture, MemoryDocumentStore};

/// URI scheme the HTTP-backed adapter registers under.
pub const PROTOCOL: &str = "tilestash:";

/// URI scheme for an ephemeral in-memory adapter (tests, local tooling).
pub const MEMORY_PROTOCOL: &str = "memory:";

/// Async opener a scheme maps to.
pub type Opener =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<TileStoreAdapter, TileError>> + Send + Sync>;

/// Scheme → opener table in the shape the host framework expects.
#[derive(Default)]
pub struct Registry {
    protocols: HashMap<String, Opener>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an opener for a scheme (e.g. `"tilestash:"`).
    pub fn register<F>(&mut self, scheme: &str, opener: F)
    where
        F: Fn(String) -> BoxFuture<'static, Result<TileStoreAdapter, TileError>>
            + Send
            + Sync
            + 'static,
    {
        self.protocols.insert(scheme.to_string(), Arc::new(opener));
    }

    /// Whether a scheme has a registered opener.
    pub fn contains(&self, scheme: &str) -> bool {
        self.protocols.contains_key(scheme)
    }

    /// Number of registered schemes.
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// Whether no scheme is registered.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Open an initialized adapter for a URI by its scheme.
    pub async fn open(&self, uri: &str) -> Result<TileStoreAdapter, TileError> {
        let scheme = match uri.find(':') {
            Some(end) => &uri[..=end],
            None => uri,
        };
        let opener = self
            .protocols
            .get(scheme)
            .ok_or_else(|| TileError::UnknownProtocol(scheme.to_string()))?;
        opener(uri.to_string()).await
    }
}

/// Register this adapter's schemes with a host protocol table.
pub fn register_protocols(registry: &mut Registry) {
    registry.register(PROTOCOL, |uri| {
        Box::pin(async move {
            let adapter = TileStoreAdapter::open(&uri)?;
            adapter.init().await
        })
    });

    registry.register(MEMORY_PROTOCOL, |_uri| {
        Box::pin(async move {
            let config = StoreConfig {
                host: "memory".to_string(),
                index: "tiles".to_string(),
                log: None,
                create_if_missing: false,
                minzoom: DEFAULT_MIN_ZOOM,
                maxzoom: DEFAULT_MAX_ZOOM,
                max_batch_size: None,
            };
            let adapter = TileStoreAdapter::new(config, Arc::new(MemoryDocumentStore::new()));
            adapter.init().await
        })
    });
}
