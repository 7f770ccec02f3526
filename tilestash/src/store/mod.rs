//! Document store abstraction.
//!
//! The `DocumentStore` trait is the seam between the tile adapter and the
//! remote keyed-JSON backend. All methods are point operations on string
//! identifiers; the adapter owns identifier derivation and payload
//! encoding, the store owns transport.
//!
//! # Design Principles
//!
//! - **String identifiers**: derived upstream, opaque to the store
//! - **No translation**: a miss is `None`/`false`, everything else is a
//!   [`StoreError`] surfaced unmodified
//! - **No retries, no added timeouts**: the store relies entirely on the
//!   underlying client's timeout behavior
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` so adapters can hold
//!   an `Arc<dyn DocumentStore>`

mod http;
mod memory;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed document category under which all tile documents are filed.
pub const DOC_TYPE: &str = "tile";

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur during store operations.
///
/// Not-found is never an error at this level; reads report it as `None`
/// and deletes as `false`.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transport-level failure (connection refused, timeout, etc.).
    #[error("store request failed: {0}")]
    Http(String),

    /// The store answered with an unexpected status code.
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The store answered with a body we could not decode.
    #[error("malformed store response: {0}")]
    Decode(String),

    /// A bulk submission reported one or more failed operations.
    #[error("bulk write failed: {0}")]
    Bulk(String),
}

/// Persisted document body.
///
/// Tile payloads are stored base64-encoded under the `data` field; the
/// info document stores its JSON bytes the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    /// Base64-encoded payload.
    pub data: String,
}

/// One element of a bulk submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOp {
    /// Create or replace a document.
    Put { id: String, body: DocumentBody },
    /// Remove a document if present.
    Delete { id: String },
}

/// Async point-operation interface to a remote document store.
///
/// # Bulk Semantics
///
/// [`DocumentStore::bulk`] submits the whole batch in a single round-trip
/// and fails loudly if any contained operation failed; it never silently
/// drops writes. The in-memory implementation applies the batch atomically
/// under one lock; the HTTP implementation maps any item-level failure in
/// the remote bulk response to a whole-call [`StoreError::Bulk`].
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait DocumentStore: Send + Sync {
    /// Lightweight liveness probe.
    ///
    /// Must succeed before reads or writes are attempted. Implementations
    /// may also perform one-time collection setup here (see
    /// [`HttpDocumentStore`] and the `createIfMissing` option).
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Point lookup by identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(body))` if the document exists
    /// - `Ok(None)` if it does not
    /// - `Err(_)` for anything else, surfaced unmodified
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<DocumentBody>, StoreError>>;

    /// Create or replace a document.
    fn put(&self, id: &str, body: DocumentBody) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Delete a document by identifier.
    ///
    /// Idempotent: deleting a non-existent document returns `Ok(false)`.
    fn delete(&self, id: &str) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Apply a batch of operations in a single round-trip.
    fn bulk(&self, ops: Vec<BulkOp>) -> BoxFuture<'_, Result<(), StoreError>>;
}

#[cfg(test)]
pub use memory::tests::FailingStore;
