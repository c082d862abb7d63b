use crate::canvas::{RasterCanvas, ResizeFilter};
use crate::geo::{GeoPoint, GeoZone};
use crate::projection::{MercatorProjector, Projector};
use crate::tile::{GridTile, TileBounds, TileIndex};
use crate::util::{tile_filename, DEFAULT_FILENAME_TEMPLATE};
use crate::TilerError;
use std::fs;
use std::path::{Path, PathBuf};

/// Pixel distances between the edges of the canvas (or of the edge tiles)
/// and some geographic edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelMargins {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Supports `%zoom%`, `%tilex%`, `%tiley%` and `%ext%`.
    pub filename_template: String,
    pub create_folder: bool,
    /// Removes the regular files directly inside the output folder first.
    pub clear_folder: bool,
    /// 1 to 100.
    pub opacity: u8,
    pub filter: ResizeFilter,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            create_folder: true,
            clear_folder: false,
            opacity: 100,
            filter: ResizeFilter::default(),
        }
    }
}

impl BuildOptions {
    pub fn validate(&self) -> Result<(), TilerError> {
        if !(1..=100).contains(&self.opacity) {
            return Err(TilerError::InvalidArgument(format!(
                "opacity must be within 1..=100, got {}",
                self.opacity
            )));
        }
        if self.filename_template.is_empty() {
            return Err(TilerError::InvalidArgument(
                "empty filename template".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mask {
    zone: GeoZone,
    color: [u8; 3],
}

/// Build plan for turning one georeferenced image into the tiles it covers.
///
/// Everything geometric is derived once, in [`TileMapper::new`]; the full
/// resolution canvas only exists for the duration of [`TileMapper::build`].
#[derive(Debug, Clone)]
pub struct TileMapper {
    zoom: u32,
    image_path: PathBuf,
    image_zone: GeoZone,
    tile_size: u32,
    so_tile: TileIndex,
    ne_tile: TileIndex,
    so_bounds: TileBounds,
    ne_bounds: TileBounds,
    tiles_zone: GeoZone,
    nb_tiles_x: u32,
    nb_tiles_y: u32,
    output_width: u32,
    output_height: u32,
    mask: Option<Mask>,
}

impl TileMapper {
    pub fn new<P: AsRef<Path>>(
        zoom: u32,
        image_path: P,
        lat1: f64,
        lat2: f64,
        lon1: f64,
        lon2: f64,
    ) -> Result<Self, TilerError> {
        Self::with_projector(&MercatorProjector::new(), zoom, image_path, lat1, lat2, lon1, lon2)
    }

    pub fn with_projector<P: AsRef<Path>>(
        projector: &dyn Projector,
        zoom: u32,
        image_path: P,
        lat1: f64,
        lat2: f64,
        lon1: f64,
        lon2: f64,
    ) -> Result<Self, TilerError> {
        let image_zone = GeoZone::new(lat1, lat2, lon1, lon2);
        let tile_size = projector.tile_size();

        let so = image_zone.southwest();
        let ne = image_zone.northeast();
        let so_tile = projector.lat_lon_to_tile(so.latitude(), so.longitude(), zoom)?;
        let ne_tile = projector.lat_lon_to_tile(ne.latitude(), ne.longitude(), zoom)?;

        // The projector reports latitudes southward-positive.
        let so_bounds = projector.tile_lat_lon_bounds(so_tile, zoom)?.flip_latitude();
        let ne_bounds = projector.tile_lat_lon_bounds(ne_tile, zoom)?.flip_latitude();

        let tiles_zone = GeoZone::from_points(
            GeoPoint::new(so_bounds.max.lat, so_bounds.min.lon),
            GeoPoint::new(ne_bounds.min.lat, ne_bounds.max.lon),
        );

        let nb_tiles_x = ((ne_tile.x - so_tile.x).abs() + 1) as u32;
        let nb_tiles_y = ((ne_tile.y - so_tile.y).abs() + 1) as u32;

        let (output_width, output_height) = match (
            nb_tiles_x.checked_mul(tile_size),
            nb_tiles_y.checked_mul(tile_size),
        ) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(TilerError::InvalidArgument(format!(
                    "canvas of {}x{} tiles exceeds u32 pixels",
                    nb_tiles_x, nb_tiles_y
                )))
            }
        };

        let mapper = TileMapper {
            zoom,
            image_path: image_path.as_ref().to_path_buf(),
            image_zone,
            tile_size,
            so_tile,
            ne_tile,
            so_bounds,
            ne_bounds,
            tiles_zone,
            nb_tiles_x,
            nb_tiles_y,
            output_width,
            output_height,
            mask: None,
        };

        info!(
            "Zoom {}: image {} covers tiles x {}..={}, y {}..={} ({}x{} tiles, {}x{} px)",
            zoom,
            image_zone,
            mapper.min_tile_x(),
            mapper.max_tile_x(),
            mapper.min_tile_y(),
            mapper.max_tile_y(),
            nb_tiles_x,
            nb_tiles_y,
            mapper.output_width,
            mapper.output_height
        );
        Ok(mapper)
    }

    /// Fills everything outside the given zone with `(r, g, b)` when building.
    pub fn set_mask_zone(&mut self, lat1: f64, lat2: f64, lon1: f64, lon2: f64, r: u8, g: u8, b: u8) {
        self.mask = Some(Mask {
            zone: GeoZone::new(lat1, lat2, lon1, lon2),
            color: [r, g, b],
        });
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn image_zone(&self) -> GeoZone {
        self.image_zone
    }

    /// Union of the south-west-most and north-east-most covered tiles.
    pub fn tiles_zone(&self) -> GeoZone {
        self.tiles_zone
    }

    pub fn mask_zone(&self) -> Option<GeoZone> {
        self.mask.map(|m| m.zone)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn min_tile_x(&self) -> i64 {
        self.so_tile.x.min(self.ne_tile.x)
    }

    pub fn max_tile_x(&self) -> i64 {
        self.so_tile.x.max(self.ne_tile.x)
    }

    // Tile rows grow southward, so the north-east tile has the smaller y.
    pub fn min_tile_y(&self) -> i64 {
        self.ne_tile.y
    }

    pub fn max_tile_y(&self) -> i64 {
        self.so_tile.y
    }

    pub fn nb_tiles_x(&self) -> u32 {
        self.nb_tiles_x
    }

    pub fn nb_tiles_y(&self) -> u32 {
        self.nb_tiles_y
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    pub fn output_height(&self) -> u32 {
        self.output_height
    }

    /// Pixels of each edge tile left uncovered by the source image.
    pub fn image_margins(&self) -> PixelMargins {
        let ts = self.tile_size as f64;

        let aso = self.tiles_zone.southwest();
        let ane = GeoPoint::new(
            self.so_bounds.min.lat.max(self.so_bounds.max.lat),
            self.so_bounds.min.lon.max(self.so_bounds.max.lon),
        );
        let a = self.image_zone.southwest();

        let left = (ts * ((a.longitude() - aso.longitude()) / (ane.longitude() - aso.longitude())))
            .floor() as i64;
        let bottom = (ts * ((a.latitude() - aso.latitude()) / (ane.latitude() - aso.latitude())))
            .floor() as i64;

        let bso = GeoPoint::new(
            self.ne_bounds.min.lat.min(self.ne_bounds.max.lat),
            self.ne_bounds.min.lon.min(self.ne_bounds.max.lon),
        );
        let bne = self.tiles_zone.northeast();
        let b = self.image_zone.northeast();

        let covered_east = (ts * ((b.longitude() - bso.longitude()) / (bne.longitude() - bso.longitude())))
            .floor() as i64;
        let covered_north = (ts * ((b.latitude() - bso.latitude()) / (bne.latitude() - bso.latitude())))
            .floor() as i64;

        PixelMargins {
            left,
            right: self.tile_size as i64 - covered_east,
            top: self.tile_size as i64 - covered_north,
            bottom,
        }
    }

    /// Size the source image is stretched to so that it spans exactly its
    /// geographic extent on the canvas. Never smaller than 1x1.
    pub fn resize_target(&self, margins: &PixelMargins) -> (u32, u32) {
        let ts = self.tile_size as i64;
        let x = (self.nb_tiles_x as i64 - 2) * ts + (ts - margins.left) + (ts - margins.right);
        let y = (self.nb_tiles_y as i64 - 2) * ts + (ts - margins.top) + (ts - margins.bottom);

        if x < 1 || y < 1 {
            warn!(
                "Image spans less than a pixel at zoom {} ({}x{}), stretching it to 1 px",
                self.zoom, x, y
            );
        }
        (x.max(1) as u32, y.max(1) as u32)
    }

    /// Width of the bands painted outside the mask zone, if one is set.
    pub fn mask_margins(&self) -> Option<PixelMargins> {
        let mask = self.mask.as_ref()?;
        let (w, h) = (self.output_width as f64, self.output_height as f64);

        let valid_nw = mask.zone.northwest();
        let valid_sw = mask.zone.southwest();
        let valid_ne = mask.zone.northeast();
        let tiles_nw = self.tiles_zone.northwest();
        let tiles_sw = self.tiles_zone.southwest();
        let tiles_ne = self.tiles_zone.northeast();

        let lat_span = tiles_nw.latitude() - tiles_sw.latitude();
        let top = h * ((tiles_nw.latitude() - valid_nw.latitude()) / lat_span);
        let bottom = h - h * ((tiles_nw.latitude() - valid_sw.latitude()) / lat_span);

        let lon_span = tiles_ne.longitude() - tiles_nw.longitude();
        let left = w * ((valid_nw.longitude() - tiles_nw.longitude()) / lon_span);
        let right = w - w * ((valid_ne.longitude() - tiles_nw.longitude()) / lon_span);

        Some(PixelMargins {
            left: left.round() as i64,
            right: right.round() as i64,
            top: top.round() as i64,
            bottom: bottom.round() as i64,
        })
    }

    /// Covered tiles in writing order: column by column from the west, each
    /// column from north to south.
    pub fn tiles(&self) -> impl Iterator<Item = GridTile> + '_ {
        let start_y = self.so_tile.y - self.nb_tiles_y as i64 + 1;
        (0..self.nb_tiles_x).flat_map(move |x| {
            (0..self.nb_tiles_y).map(move |y| GridTile {
                index: TileIndex::new(self.so_tile.x + x as i64, start_y + y as i64),
                zoom: self.zoom,
                canvas_x: x * self.tile_size,
                canvas_y: y * self.tile_size,
            })
        })
    }

    /// Resamples, composites and masks the source image onto a canvas of
    /// `output_width` x `output_height` pixels aligned on the tile grid.
    pub fn render(&self, options: &BuildOptions) -> Result<RasterCanvas, TilerError> {
        options.validate()?;

        let margins = self.image_margins();
        let (target_w, target_h) = self.resize_target(&margins);
        debug!("Image margins {:?}, resizing source to {}x{}", margins, target_w, target_h);

        let mut source = RasterCanvas::open(&self.image_path)?;
        source.resize(target_w, target_h, options.filter);

        let mut full = RasterCanvas::blank(self.output_width, self.output_height);
        full.import_at(&source, margins.left, margins.top);
        if options.opacity < 100 {
            full.set_opacity(options.opacity)?;
        }

        if let (Some(mask), Some(m)) = (self.mask.as_ref(), self.mask_margins()) {
            debug!("Mask margins {:?}, fill color {:?}", m, mask.color);
            let (w, h) = (self.output_width as i64, self.output_height as i64);

            // Bands overlap at the corners, which is harmless with a single color.
            full.fill_rectangle(0, 0, w, m.top, mask.color);
            full.fill_rectangle(0, h - m.bottom, w, h, mask.color);
            full.fill_rectangle(0, 0, m.left, h, mask.color);
            full.fill_rectangle(w - m.right, 0, w, h, mask.color);
        }

        Ok(full)
    }

    /// Slices `canvas` into tiles and writes each one under `folder`.
    pub fn write_tiles<P: AsRef<Path>>(
        &self,
        canvas: &RasterCanvas,
        folder: P,
        filename_template: &str,
    ) -> Result<Vec<PathBuf>, TilerError> {
        let folder = folder.as_ref();
        let ext = canvas.native_extension();
        let mut written = Vec::with_capacity(self.nb_tiles_x as usize * self.nb_tiles_y as usize);

        for t in self.tiles() {
            let part = canvas.extract_region(t.canvas_x, t.canvas_y, self.tile_size, self.tile_size);
            let name = tile_filename(filename_template, t.zoom, t.index.x, t.index.y, ext);
            let path = folder.join(name);

            if let Some(parent) = path.parent() {
                if !parent.is_dir() {
                    fs::create_dir_all(parent).map_err(TilerError::filesystem(parent))?;
                }
            }
            part.write(&path)?;
            debug!("Wrote tile {} to {}", t.index, path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Writes every covered tile to `folder`, returning the written paths.
    ///
    /// Tiles already written when an error occurs are left in place.
    pub fn build<P: AsRef<Path>>(
        &self,
        folder: P,
        options: &BuildOptions,
    ) -> Result<Vec<PathBuf>, TilerError> {
        let folder = folder.as_ref();
        options.validate()?;
        prepare_folder(folder, options.create_folder, options.clear_folder)?;

        let full = self.render(options)?;
        let written = self.write_tiles(&full, folder, &options.filename_template)?;

        info!("Wrote {} tiles to {}", written.len(), folder.display());
        Ok(written)
    }
}

fn prepare_folder(folder: &Path, create: bool, clear: bool) -> Result<(), TilerError> {
    if !folder.is_dir() {
        if !create {
            return Err(TilerError::MissingFolder(folder.to_path_buf()));
        }
        fs::create_dir_all(folder).map_err(TilerError::filesystem(folder))?;
        debug!("Created {}", folder.display());
    }

    if clear {
        for entry in fs::read_dir(folder).map_err(TilerError::filesystem(folder))? {
            let path = entry.map_err(TilerError::filesystem(folder))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(TilerError::filesystem(&path))?;
            }
        }
    }
    Ok(())
}
