use crate::TilerError;
use std::str::FromStr;

/// WGS84 equatorial radius, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.;

pub const DEFAULT_FILENAME_TEMPLATE: &str = "%zoom%_%tilex%_%tiley%.%ext%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
}

impl FromStr for DistanceUnit {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            _ => Err(TilerError::InvalidArgument(format!(
                "unit not recognized: {}",
                s
            ))),
        }
    }
}

/// Great-circle distance between two points (haversine), on a sphere of
/// radius [`EARTH_RADIUS`].
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: DistanceUnit) -> f64 {
    let (rla1, rlo1) = (lat1.to_radians(), lon1.to_radians());
    let (rla2, rlo2) = (lat2.to_radians(), lon2.to_radians());
    let dlo = (rlo2 - rlo1) / 2.;
    let dla = (rla2 - rla1) / 2.;

    let a = dla.sin() * dla.sin() + rla1.cos() * rla2.cos() * (dlo.sin() * dlo.sin());
    let c = 2. * a.sqrt().atan2((1. - a).sqrt());
    let meters = EARTH_RADIUS * c;

    match unit {
        DistanceUnit::Meters => meters,
        DistanceUnit::Kilometers => meters / 1000.,
    }
}

/// Same as [`haversine`], with the unit given by its symbol (`"m"` or `"km"`).
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: &str) -> Result<f64, TilerError> {
    let unit: DistanceUnit = unit.parse()?;
    Ok(haversine(lat1, lon1, lat2, lon2, unit))
}

/// Expands the `%zoom%`, `%tilex%`, `%tiley%` and `%ext%` placeholders of a
/// tile filename template.
pub fn tile_filename(template: &str, zoom: u32, tile_x: i64, tile_y: i64, ext: &str) -> String {
    template
        .replace("%zoom%", &zoom.to_string())
        .replace("%tilex%", &tile_x.to_string())
        .replace("%tiley%", &tile_y.to_string())
        .replace("%ext%", ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_known_distance() {
        // Paris (Notre-Dame) to London (Trafalgar Square), roughly 343 km
        let d = distance(48.853, 2.3499, 51.508, -0.128, "km").unwrap();
        assert!((d - 343.).abs() < 5., "got {} km", d);
    }

    #[test]
    fn test_quarter_meridian() {
        let d = distance(0., 0., 90., 0., "m").unwrap();
        let expected = EARTH_RADIUS * std::f64::consts::PI / 2.;
        assert!((d - expected).abs() < 1e-3);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert!(distance(48.86, 2.34, 48.86, 2.34, "m").unwrap().abs() < EPSILON);
        assert!(distance(-33.9, 151.2, -33.9, 151.2, "km").unwrap().abs() < EPSILON);
    }

    #[test]
    fn test_unknown_unit() {
        let err = distance(0., 0., 1., 1., "mi").unwrap_err();
        assert!(matches!(err, TilerError::InvalidArgument(_)));
        assert!(distance(0., 0., 1., 1., "").is_err());
        assert!(distance(0., 0., 1., 1., "KM").is_err());
    }

    #[test]
    fn test_units_and_symmetry_random_points() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let (lat1, lon1) = (rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0));
            let (lat2, lon2) = (rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0));

            let m = distance(lat1, lon1, lat2, lon2, "m").unwrap();
            let km = distance(lat1, lon1, lat2, lon2, "km").unwrap();
            let back = distance(lat2, lon2, lat1, lon1, "m").unwrap();

            assert!((m - km * 1000.).abs() < 1e-3, "{} m vs {} km", m, km);
            assert!((m - back).abs() < 1e-3, "{} vs {}", m, back);
            assert!(m >= 0.);
        }
    }

    #[test]
    fn test_default_template() {
        assert_eq!(
            tile_filename(DEFAULT_FILENAME_TEMPLATE, 5, 10, 7, "png"),
            "5_10_7.png"
        );
    }

    #[test]
    fn test_custom_template() {
        assert_eq!(
            tile_filename("%zoom%/%tilex%/%tiley%.%ext%", 15, 16596, 11271, "jpg"),
            "15/16596/11271.jpg"
        );
        assert_eq!(
            tile_filename("tile-%tilex%-%tilex%", 3, 1, 2, "png"),
            "tile-1-1"
        );
    }
}
