//! Cuts a georeferenced raster image into slippy map tiles at one zoom level.
//!
//! A [`TileMapper`] works out which tiles an image covers, resamples the image
//! so it lines up pixel for pixel with the tile grid, optionally fills
//! everything outside a "valid" zone with a solid color, and writes one file
//! per tile.

#[macro_use]
extern crate log;

pub mod canvas;
pub mod geo;
pub mod job;
pub mod mapper;
pub mod projection;
pub mod tile;
pub mod util;

pub use canvas::{RasterCanvas, ResizeFilter};
pub use geo::{GeoPoint, GeoZone};
pub use job::Job;
pub use mapper::{BuildOptions, PixelMargins, TileMapper};
pub use projection::{MercatorProjector, ProjectionError, Projector};
pub use tile::{GridTile, LatLon, TileBounds, TileIndex, TILE_SIZE};
pub use util::{distance, haversine, tile_filename, DistanceUnit, DEFAULT_FILENAME_TEMPLATE};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("folder {0} does not exist")]
    MissingFolder(PathBuf),
    #[error("filesystem error on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("some I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("some serde json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TilerError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> TilerError {
        let path = path.into();
        move |source| TilerError::Filesystem { path, source }
    }

    /// True for the errors caused by the output folder or by writing tiles.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            TilerError::MissingFolder(_) | TilerError::Filesystem { .. }
        )
    }
}
