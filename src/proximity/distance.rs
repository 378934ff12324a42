//! Haversine great-circle distance.

use crate::models::Coordinate;

/// Mean Earth radius in miles used throughout the county dataset.
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// A sphere of a given radius. Distances come out in the radius' unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius_miles: f64,
}

impl Sphere {
    pub const EARTH: Sphere = Sphere {
        radius_miles: EARTH_RADIUS_MILES,
    };

    pub fn new(radius_miles: f64) -> Self {
        Self { radius_miles }
    }

    /// Great-circle distance between two coordinates.
    ///
    /// Identical coordinates give exactly 0.
    pub fn distance(&self, a: Coordinate, b: Coordinate) -> f64 {
        let (lat1, lon1) = (a.lat().to_radians(), a.lon().to_radians());
        let (lat2, lon2) = (b.lat().to_radians(), b.lon().to_radians());

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // Rounding can push h slightly outside [0, 1] near identical or antipodal points
        let h = h.clamp(0.0, 1.0);

        2.0 * self.radius_miles * h.sqrt().asin()
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::EARTH
    }
}

/// Great-circle distance in miles on a sphere of radius 3956 miles.
pub fn great_circle_distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    Sphere::EARTH.distance(a, b)
}
