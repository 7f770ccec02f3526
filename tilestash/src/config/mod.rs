//! Connection-descriptor parsing.
//!
//! An adapter is configured from a connection URI whose query parameters
//! carry the store endpoint and tileset options, e.g.:
//!
//! ```text
//! tilestash://?host=localhost:9200&index=tiles&minzoom=4&maxzoom=16
//! ```
//!
//! `host` and `index` are mandatory; everything else has a stated default.
//! Parsing never touches the network — connectivity is only checked by
//! `TileStoreAdapter::init()`.

use std::collections::HashMap;

use thiserror::Error;

use crate::coord::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Errors that can occur while building a [`StoreConfig`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The connection descriptor is not a parseable URI.
    #[error("invalid connection uri: {0}")]
    InvalidUri(String),

    /// The mandatory `host` query parameter is missing.
    #[error("uri must include at least one 'host' connect point query parameter")]
    MissingHost,

    /// The mandatory `index` query parameter is missing or empty.
    #[error("uri must have a valid 'index' query parameter")]
    MissingIndex,

    /// A query parameter has a value that cannot be parsed.
    #[error("invalid value for '{name}': {value}")]
    InvalidParameter { name: String, value: String },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to create store client: {0}")]
    Client(String),
}

/// Immutable adapter configuration derived from a connection URI.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store endpoint, e.g. `localhost:9200`.
    pub host: String,

    /// Target collection (index) name.
    pub index: String,

    /// Diagnostic verbosity passed through to the store client.
    pub log: Option<String>,

    /// Whether the store client may auto-create the collection.
    pub create_if_missing: bool,

    /// Inclusive lower zoom bound served/accepted by this adapter.
    pub minzoom: u8,

    /// Inclusive upper zoom bound served/accepted by this adapter.
    pub maxzoom: u8,

    /// Batch-accumulation threshold; `None` disables batching by size.
    pub max_batch_size: Option<usize>,
}

impl StoreConfig {
    /// Parse a connection descriptor URI into a config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the URI is malformed, a mandatory
    /// parameter is missing, or a numeric parameter fails to parse.
    pub fn from_uri(descriptor: &str) -> Result<Self, ConfigError> {
        let url = reqwest::Url::parse(descriptor)
            .map_err(|e| ConfigError::InvalidUri(e.to_string()))?;

        // First occurrence wins for repeated parameters.
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in url.query_pairs() {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        let host = params
            .get("host")
            .filter(|h| !h.is_empty())
            .cloned()
            .ok_or(ConfigError::MissingHost)?;

        let index = params
            .get("index")
            .filter(|i| !i.is_empty())
            .cloned()
            .ok_or(ConfigError::MissingIndex)?;

        let log = params.get("log").cloned();
        let create_if_missing = params
            .get("createIfMissing")
            .map(|v| is_truthy(v))
            .unwrap_or(false);

        let minzoom = parse_param(&params, "minzoom")?.unwrap_or(DEFAULT_MIN_ZOOM);
        let maxzoom = parse_param(&params, "maxzoom")?.unwrap_or(DEFAULT_MAX_ZOOM);
        let max_batch_size = parse_param(&params, "maxBatchSize")?;

        Ok(Self {
            host,
            index,
            log,
            create_if_missing,
            minzoom,
            maxzoom,
            max_batch_size,
        })
    }

    /// Base URL of the store endpoint, defaulting to `http://` when the
    /// host carries no scheme.
    pub fn endpoint_url(&self) -> String {
        if self.host.contains("://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", self.host.trim_end_matches('/'))
        }
    }
}

/// Parse an optional numeric query parameter.
fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    match params.get(name) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidParameter {
                name: name.to_string(),
                value: value.clone(),
            }),
    }
}

/// Boolean coercion for flag-style query parameters.
fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "0" | "false")
}
