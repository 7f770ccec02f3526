//! Read request and response shapes.
//!
//! The host framework's read request is an untyped map with an optional
//! `type` discriminator; internally it is modeled as an explicit sum type.
//! [`GetRequest::from_json`] adapts the untyped boundary shape.

use serde::Serialize;
use serde_json::Value;

use crate::adapter::TileError;

/// Fixed content headers returned with every tile response.
///
/// The adapter always declares this content typing: callers are expected
/// to store pre-compressed protobuf tiles, and the adapter passes them
/// through without inspecting the payload.
pub const TILE_HEADERS: TileHeaders = TileHeaders {
    content_type: "application/x-protobuf",
    content_encoding: "gzip",
};

/// Content headers attached to tile responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileHeaders {
    #[serde(rename = "Content-Type")]
    pub content_type: &'static str,
    #[serde(rename = "Content-Encoding")]
    pub content_encoding: &'static str,
}

/// A read request against the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetRequest {
    /// Look up a single tile by grid coordinate.
    Tile { z: u8, x: u32, y: u32 },
    /// Look up the tileset metadata document.
    Info,
}

impl GetRequest {
    /// Shorthand for a tile lookup.
    pub fn tile(z: u8, x: u32, y: u32) -> Self {
        Self::Tile { z, x, y }
    }

    /// Parse the host framework's untyped request shape.
    ///
    /// An absent `type` field or `"tile"` routes to a tile lookup, which
    /// requires integer `z`, `x`, `y`; `"info"` routes to the metadata
    /// lookup; any other discriminator is rejected.
    pub fn from_json(value: &Value) -> Result<Self, TileError> {
        match value.get("type") {
            None | Some(Value::Null) => Self::tile_from_json(value),
            Some(Value::String(kind)) => match kind.as_str() {
                "tile" => Self::tile_from_json(value),
                "info" => Ok(Self::Info),
                other => Err(TileError::UnknownRequestType(other.to_string())),
            },
            Some(other) => Err(TileError::UnknownRequestType(other.to_string())),
        }
    }

    fn tile_from_json(value: &Value) -> Result<Self, TileError> {
        let coord = |field: &str| value.get(field).and_then(Value::as_u64);
        match (coord("z"), coord("x"), coord("y")) {
            (Some(z), Some(x), Some(y)) => {
                let z = u8::try_from(z).map_err(|_| invalid_coords())?;
                let x = u32::try_from(x).map_err(|_| invalid_coords())?;
                let y = u32::try_from(y).map_err(|_| invalid_coords())?;
                Ok(Self::Tile { z, x, y })
            }
            _ => Err(invalid_coords()),
        }
    }
}

fn invalid_coords() -> TileError {
    TileError::InvalidRequest("tile request requires integer z, x, y".to_string())
}

/// A successful read response.
#[derive(Debug, Clone, PartialEq)]
pub enum GetResponse {
    /// Raw tile bytes with the fixed content headers.
    Tile {
        data: Vec<u8>,
        headers: TileHeaders,
    },
    /// Parsed tileset metadata; info responses carry no headers.
    Info { data: Value },
}

impl GetResponse {
    /// Tile payload bytes, if this is a tile response.
    pub fn tile_data(&self) -> Option<&[u8]> {
        match self {
            Self::Tile { data, .. } => Some(data),
            Self::Info { .. } => None,
        }
    }

    /// Metadata object, if this is an info response.
    pub fn info_data(&self) -> Option<&Value> {
        match self {
            Self::Info { data } => Some(data),
            Self::Tile { .. } => None,
        }
    }
}
