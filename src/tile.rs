use serde::{Deserialize, Serialize};

pub const TILE_SIZE: u32 = 256;

/// Tile coordinate in the slippy map scheme: x grows eastward, y grows
/// southward, both in `[0, 2^zoom)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileIndex {
    pub x: i64,
    pub y: i64,
}

impl TileIndex {
    pub fn new(x: i64, y: i64) -> Self {
        TileIndex { x, y }
    }
}

impl std::fmt::Display for TileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Geographic extent of one tile, as reported by a projector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TileBounds {
    pub min: LatLon,
    pub max: LatLon,
}

impl TileBounds {
    /// Negates both latitudes, switching between the southward-positive
    /// convention of [`crate::projection::Projector::tile_lat_lon_bounds`] and
    /// signed latitudes.
    pub fn flip_latitude(self) -> Self {
        TileBounds {
            min: LatLon {
                lat: -self.min.lat,
                lon: self.min.lon,
            },
            max: LatLon {
                lat: -self.max.lat,
                lon: self.max.lon,
            },
        }
    }
}

/// A tile of the output grid: its index and where it sits on the full canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTile {
    pub index: TileIndex,
    pub zoom: u32,
    pub canvas_x: u32,
    pub canvas_y: u32,
}
