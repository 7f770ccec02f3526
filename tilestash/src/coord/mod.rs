//! Tile coordinates and document-identifier derivation.
//!
//! Tiles are addressed by Web Mercator grid coordinates (zoom level plus
//! x/y column/row). The document store keys every tile by a stable string
//! identifier derived from its coordinate; the tileset metadata document
//! lives under the reserved identifier [`INFO_DOC_ID`].
//!
//! # Identifier Format
//!
//! Identifiers follow the format `{zoom}_{x}_{y}`.
//! Example: `15_5279_12754`
//!
//! The mapping is injective: zoom, x and y are unsigned integers, so two
//! distinct coordinates always produce distinct identifiers, and the
//! numeric-underscore form can never equal the reserved `"info"` literal.

use std::fmt;

/// Default lower zoom bound for an adapter.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// Default upper zoom bound for an adapter.
pub const DEFAULT_MAX_ZOOM: u8 = 22;

/// Reserved document identifier for the tileset metadata document.
pub const INFO_DOC_ID: &str = "info";

/// A tile address on the Web Mercator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level.
    pub zoom: u8,
    /// Column (west to east).
    pub x: u32,
    /// Row (north to south).
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Derive the document identifier for this coordinate.
    ///
    /// Format: `{zoom}_{x}_{y}`
    pub fn doc_id(&self) -> String {
        format!("{}_{}_{}", self.zoom, self.x, self.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
