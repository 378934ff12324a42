//! Counting targets inside a radius.

use super::Sphere;
use crate::models::{Coordinate, GeoPoint, RadiusCountResult};

impl Sphere {
    /// Count targets within `radius_miles` of `reference`, boundary included.
    ///
    /// A partial reference always counts 0. Partial targets are never counted.
    pub fn count_within_radius(
        &self,
        reference: &GeoPoint,
        targets: &[GeoPoint],
        radius_miles: f64,
    ) -> RadiusCountResult {
        let count = match reference.coordinate() {
            Some(origin) => targets
                .iter()
                .filter_map(GeoPoint::coordinate)
                .filter(|c| self.is_within(origin, *c, radius_miles))
                .count(),
            None => 0,
        };

        RadiusCountResult {
            reference_id: reference.id.clone(),
            count,
        }
    }

    pub(crate) fn is_within(&self, a: Coordinate, b: Coordinate, radius_miles: f64) -> bool {
        self.distance(a, b) <= radius_miles
    }
}

/// [`Sphere::count_within_radius`] on the Earth sphere.
pub fn count_within_radius(
    reference: &GeoPoint,
    targets: &[GeoPoint],
    radius_miles: f64,
) -> RadiusCountResult {
    Sphere::EARTH.count_within_radius(reference, targets, radius_miles)
}
