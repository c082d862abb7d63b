use crate::canvas::ResizeFilter;
use crate::mapper::{BuildOptions, TileMapper};
use crate::util::DEFAULT_FILENAME_TEMPLATE;
use crate::TilerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ZoneSpec {
    pub lat1: f64,
    pub lat2: f64,
    pub lon1: f64,
    pub lon2: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MaskSpec {
    #[serde(flatten)]
    pub zone: ZoneSpec,
    pub color: [u8; 3],
}

/// Everything needed to tile one image, as stored in a JSON job file.
///
/// ```json
/// {
///   "image": "paris.png",
///   "zoom": 15,
///   "bounds": { "lat1": 48.86, "lat2": 48.87, "lon1": 2.34, "lon2": 2.35 },
///   "output": "tiles",
///   "mask": { "lat1": 48.862, "lat2": 48.868, "lon1": 2.342, "lon2": 2.348, "color": [0, 0, 0] }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Job {
    pub image: PathBuf,
    pub zoom: u32,
    pub bounds: ZoneSpec,
    pub output: PathBuf,
    #[serde(default)]
    pub mask: Option<MaskSpec>,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_true")]
    pub create_folder: bool,
    #[serde(default)]
    pub clear_folder: bool,
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub filter: ResizeFilter,
}

fn default_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> u8 {
    100
}

impl Job {
    /// Loads a job; relative `image` and `output` paths are taken relative to
    /// the job file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TilerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut job: Job = serde_json::from_str(&contents)?;

        if let Some(base) = path.parent() {
            if job.image.is_relative() {
                job.image = base.join(&job.image);
            }
            if job.output.is_relative() {
                job.output = base.join(&job.output);
            }
        }
        Ok(job)
    }

    pub fn mapper(&self) -> Result<TileMapper, TilerError> {
        let b = &self.bounds;
        let mut mapper = TileMapper::new(self.zoom, &self.image, b.lat1, b.lat2, b.lon1, b.lon2)?;
        if let Some(mask) = &self.mask {
            let z = &mask.zone;
            let [r, g, b] = mask.color;
            mapper.set_mask_zone(z.lat1, z.lat2, z.lon1, z.lon2, r, g, b);
        }
        Ok(mapper)
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            filename_template: self.template.clone(),
            create_folder: self.create_folder,
            clear_folder: self.clear_folder,
            opacity: self.opacity,
            filter: self.filter,
        }
    }

    pub fn run(&self) -> Result<Vec<PathBuf>, TilerError> {
        self.mapper()?.build(&self.output, &self.options())
    }
}
