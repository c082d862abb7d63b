use crate::tile::{LatLon, TileBounds, TileIndex, TILE_SIZE};
use std::f64::consts::PI;
use thiserror::Error;

// https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames

pub const MAX_LATITUDE: f64 = 85.05112877980659;
pub const MAX_ZOOM: u32 = 30;

pub trait Projector {
    /// Index of the tile covering `(lat, lon)` at `zoom`.
    fn lat_lon_to_tile(&self, lat: f64, lon: f64, zoom: u32) -> Result<TileIndex, ProjectionError>;

    /// Geographic extent of a tile.
    ///
    /// Latitudes are southward-positive: the row is read from the south, so
    /// the returned latitudes are those of the mirrored row. Callers negate
    /// both latitudes (see [`TileBounds::flip_latitude`]) to get the tile's
    /// real north/south edges, with `min.lat` the north edge and `max.lat`
    /// the south edge.
    fn tile_lat_lon_bounds(&self, tile: TileIndex, zoom: u32) -> Result<TileBounds, ProjectionError>;

    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }
}

/// Spherical Web Mercator, 256 pixel tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MercatorProjector {}

impl MercatorProjector {
    pub fn new() -> Self {
        MercatorProjector {}
    }

    fn tiles_per_axis(zoom: u32) -> Result<i64, ProjectionError> {
        if zoom > MAX_ZOOM {
            return Err(ProjectionError::InvalidZoom(zoom));
        }
        Ok(1i64 << zoom)
    }

    fn column_longitude(x: i64, n: i64) -> f64 {
        x as f64 / n as f64 * 360. - 180.
    }

    // Latitude of the north edge of row `y`, rows counted from the north.
    fn row_latitude(y: i64, n: i64) -> f64 {
        (PI * (1. - 2. * y as f64 / n as f64)).sinh().atan().to_degrees()
    }
}

impl Projector for MercatorProjector {
    fn lat_lon_to_tile(&self, lat: f64, lon: f64, zoom: u32) -> Result<TileIndex, ProjectionError> {
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(ProjectionError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || lon.abs() > 180. {
            return Err(ProjectionError::InvalidLongitude(lon));
        }
        let n = Self::tiles_per_axis(zoom)?;

        let lat_rad = lat.to_radians();
        let x = ((lon + 180.) / 360. * n as f64).floor() as i64;
        let y = ((1. - lat_rad.tan().asinh() / PI) / 2. * n as f64).floor() as i64;

        Ok(TileIndex::new(x.clamp(0, n - 1), y.clamp(0, n - 1)))
    }

    fn tile_lat_lon_bounds(&self, tile: TileIndex, zoom: u32) -> Result<TileBounds, ProjectionError> {
        let n = Self::tiles_per_axis(zoom)?;
        if !(0..n).contains(&tile.x) || !(0..n).contains(&tile.y) {
            return Err(ProjectionError::TileOutOfRange(tile, zoom));
        }

        // Reading row y from the south puts its south edge at the mirror of
        // row y's north edge.
        Ok(TileBounds {
            min: LatLon {
                lat: -Self::row_latitude(tile.y, n),
                lon: Self::column_longitude(tile.x, n),
            },
            max: LatLon {
                lat: -Self::row_latitude(tile.y + 1, n),
                lon: Self::column_longitude(tile.x + 1, n),
            },
        })
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ProjectionError {
    #[error("latitude {0} is outside the Web Mercator range")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
    #[error("zoom level {0} is not supported")]
    InvalidZoom(u32),
    #[error("tile {0} does not exist at zoom {1}")]
    TileOutOfRange(TileIndex, u32),
}
