//! HTTP document store backed by reqwest.
//!
//! Speaks an Elasticsearch-style REST dialect: documents live at
//! `/{index}/{type}/{id}` with the constant type segment [`DOC_TYPE`], and
//! batches go to `/{index}/_bulk` as newline-delimited JSON.
//!
//! The client performs no retries and adds no timeouts of its own; callers
//! get whatever timeout behavior reqwest provides.

use serde::Deserialize;
use tracing::debug;

use crate::config::{ConfigError, StoreConfig};
use crate::store::{BoxFuture, BulkOp, DocumentBody, DocumentStore, StoreError, DOC_TYPE};

/// Document store client for an HTTP keyed-JSON backend.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    /// Endpoint base URL, no trailing slash.
    base: String,
    /// Target collection name.
    index: String,
    /// Create the collection during `ping()` if it does not exist.
    create_if_missing: bool,
    /// Emit per-request debug events (the `log` connection parameter).
    verbose: bool,
}

/// Response shape of a point lookup.
#[derive(Debug, Deserialize)]
struct GetDocResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<DocumentBody>,
}

/// Response shape of a bulk submission.
#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
}

impl HttpDocumentStore {
    /// Build a client from an adapter configuration.
    ///
    /// Does not touch the network; connectivity is checked by `ping()`.
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let verbose = matches!(config.log.as_deref(), Some("debug") | Some("trace"));

        Ok(Self {
            client,
            base: config.endpoint_url(),
            index: config.index.clone(),
            create_if_missing: config.create_if_missing,
            verbose,
        })
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/{}/{}", self.base, self.index, DOC_TYPE, id)
    }

    fn trace(&self, method: &str, url: &str) {
        if self.verbose {
            debug!(method, url, "store request");
        }
    }

    async fn ensure_index(&self) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.base, self.index);
        self.trace("HEAD", &url);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        if response.status().as_u16() != 404 {
            return Ok(());
        }

        self.trace("PUT", &url);
        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            })
        }
    }
}

/// Serialize a batch into newline-delimited JSON for the `_bulk` endpoint.
///
/// Each `Put` becomes an action line plus a source line; each `Delete`
/// becomes a single action line. The body ends with a newline as the
/// protocol requires.
fn bulk_body(ops: &[BulkOp]) -> Result<String, StoreError> {
    let mut body = String::new();
    for op in ops {
        match op {
            BulkOp::Put { id, body: doc } => {
                body.push_str(&format!(
                    "{{\"index\":{{\"_type\":\"{}\",\"_id\":{}}}}}\n",
                    DOC_TYPE,
                    serde_json::to_string(id).map_err(|e| StoreError::Decode(e.to_string()))?
                ));
                body.push_str(
                    &serde_json::to_string(doc)
                        .map_err(|e| StoreError::Decode(e.to_string()))?,
                );
                body.push('\n');
            }
            BulkOp::Delete { id } => {
                body.push_str(&format!(
                    "{{\"delete\":{{\"_type\":\"{}\",\"_id\":{}}}}}\n",
                    DOC_TYPE,
                    serde_json::to_string(id).map_err(|e| StoreError::Decode(e.to_string()))?
                ));
            }
        }
    }
    Ok(body)
}

impl DocumentStore for HttpDocumentStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let url = format!("{}/", self.base);
            self.trace("GET", &url);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            if !response.status().is_success() {
                return Err(StoreError::UnexpectedStatus {
                    status: response.status().as_u16(),
                    url,
                });
            }

            if self.create_if_missing {
                self.ensure_index().await?;
            }
            Ok(())
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<DocumentBody>, StoreError>> {
        let url = self.doc_url(id);
        Box::pin(async move {
            self.trace("GET", &url);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            let status = response.status();
            if status.as_u16() == 404 {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(StoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                });
            }

            let doc: GetDocResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            if doc.found {
                Ok(doc.source)
            } else {
                Ok(None)
            }
        })
    }

    fn put(&self, id: &str, body: DocumentBody) -> BoxFuture<'_, Result<(), StoreError>> {
        let url = self.doc_url(id);
        Box::pin(async move {
            self.trace("PUT", &url);
            let response = self
                .client
                .put(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(StoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let url = self.doc_url(id);
        Box::pin(async move {
            self.trace("DELETE", &url);
            let response = self
                .client
                .delete(&url)
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            let status = response.status();
            if status.as_u16() == 404 {
                return Ok(false);
            }
            if status.is_success() {
                Ok(true)
            } else {
                Err(StoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                })
            }
        })
    }

    fn bulk(&self, ops: Vec<BulkOp>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if ops.is_empty() {
                return Ok(());
            }

            let url = format!("{}/{}/_bulk", self.base, self.index);
            self.trace("POST", &url);
            let body = bulk_body(&ops)?;
            let response = self
                .client
                .post(&url)
                .header("Content-Type", "application/x-ndjson")
                .body(body)
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                });
            }

            let summary: BulkResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            if summary.errors {
                Err(StoreError::Bulk(format!(
                    "store rejected one or more of {} operations",
                    ops.len()
                )))
            } else {
                Ok(())
            }
        })
    }
}
