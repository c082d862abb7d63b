use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Axis-aligned rectangle in latitude/longitude space.
///
/// The two defining points may be given in any order; the four corners are
/// normalized so that the north edge carries the larger latitude and the west
/// edge the smaller longitude. Degenerate (zero-area) zones are accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoZone {
    northwest: GeoPoint,
    northeast: GeoPoint,
    southwest: GeoPoint,
    southeast: GeoPoint,
}

impl GeoZone {
    pub fn new(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> Self {
        let north = lat1.max(lat2);
        let south = lat1.min(lat2);
        let west = lon1.min(lon2);
        let east = lon1.max(lon2);

        GeoZone {
            northwest: GeoPoint::new(north, west),
            northeast: GeoPoint::new(north, east),
            southwest: GeoPoint::new(south, west),
            southeast: GeoPoint::new(south, east),
        }
    }

    pub fn from_points(a: GeoPoint, b: GeoPoint) -> Self {
        Self::new(a.latitude(), b.latitude(), a.longitude(), b.longitude())
    }

    pub fn northwest(&self) -> GeoPoint {
        self.northwest
    }

    pub fn northeast(&self) -> GeoPoint {
        self.northeast
    }

    pub fn southwest(&self) -> GeoPoint {
        self.southwest
    }

    pub fn southeast(&self) -> GeoPoint {
        self.southeast
    }

    pub fn north(&self) -> f64 {
        self.northwest.latitude()
    }

    pub fn south(&self) -> f64 {
        self.southwest.latitude()
    }

    pub fn west(&self) -> f64 {
        self.northwest.longitude()
    }

    pub fn east(&self) -> f64 {
        self.northeast.longitude()
    }
}

impl std::fmt::Display for GeoZone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{} - {}]", self.southwest, self.northeast)
    }
}
