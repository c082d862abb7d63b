use crate::TilerError;
use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(f: ResizeFilter) -> FilterType {
        match f {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// In-memory RGBA raster plus the file format it is written in.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    img: RgbaImage,
    format: ImageFormat,
}

impl RasterCanvas {
    /// Fully transparent canvas, written as PNG.
    pub fn blank(width: u32, height: u32) -> Self {
        RasterCanvas {
            img: ImageBuffer::new(width, height),
            format: ImageFormat::Png,
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TilerError> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let img = image::open(path)?.to_rgba8();
        debug!(
            "Opened {} ({}x{}, {:?})",
            path.display(),
            img.width(),
            img.height(),
            format
        );
        Ok(RasterCanvas { img, format })
    }

    pub fn from_image(img: RgbaImage, format: ImageFormat) -> Self {
        RasterCanvas { img, format }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn native_extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tif",
            ImageFormat::Tga => "tga",
            _ => "png",
        }
    }

    /// Resizes to exactly `width` x `height`, ignoring the aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32, filter: ResizeFilter) {
        self.img = imageops::resize(&self.img, width, height, filter.into());
    }

    /// Alpha-blends `source` onto this canvas with its top-left corner at
    /// `(x, y)`. Parts falling outside the canvas are dropped.
    pub fn import_at(&mut self, source: &RasterCanvas, x: i64, y: i64) {
        imageops::overlay(&mut self.img, &source.img, x, y);
    }

    /// Scales the alpha channel of every pixel by `percent` / 100.
    pub fn set_opacity(&mut self, percent: u8) -> Result<(), TilerError> {
        if !(1..=100).contains(&percent) {
            return Err(TilerError::InvalidArgument(format!(
                "opacity must be within 1..=100, got {}",
                percent
            )));
        }
        for pixel in self.img.pixels_mut() {
            pixel[3] = (pixel[3] as u32 * percent as u32 / 100) as u8;
        }
        Ok(())
    }

    /// Paints the half-open pixel rectangle `[x0, x1) x [y0, y1)` with an
    /// opaque color. Corners may be given in any order and are clamped to the
    /// canvas; an empty rectangle paints nothing.
    pub fn fill_rectangle(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, rgb: [u8; 3]) {
        let (w, h) = (self.width() as i64, self.height() as i64);
        let left = x0.min(x1).clamp(0, w);
        let right = x0.max(x1).clamp(0, w);
        let top = y0.min(y1).clamp(0, h);
        let bottom = y0.max(y1).clamp(0, h);

        if right <= left || bottom <= top {
            return;
        }
        let rect = Rect::at(left as i32, top as i32)
            .of_size((right - left) as u32, (bottom - top) as u32);
        draw_filled_rect_mut(&mut self.img, rect, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    }

    /// Copies out a `width` x `height` region starting at `(x, y)`.
    pub fn extract_region(&self, x: u32, y: u32, width: u32, height: u32) -> RasterCanvas {
        RasterCanvas {
            img: imageops::crop_imm(&self.img, x, y, width, height).to_image(),
            format: self.format,
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TilerError> {
        let path = path.as_ref();
        self.img
            .save_with_format(path, self.format)
            .map_err(|e| match e {
                image::ImageError::IoError(source) => TilerError::Filesystem {
                    path: path.to_path_buf(),
                    source,
                },
                other => TilerError::Image(other),
            })
    }
}
