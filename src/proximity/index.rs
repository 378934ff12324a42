//! R-tree over target points for radius queries.
//!
//! Targets are placed on the unit sphere in 3D. For a sphere of radius R a
//! great-circle distance d corresponds to a straight chord of
//! `2 * sin(d / 2R)`, which grows monotonically with d, so the tree can
//! pre-select candidates by chord length. Every candidate is then checked
//! with the exact haversine test, which keeps counts identical to a full scan.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use tracing::debug;

use super::Sphere;
use crate::models::{Coordinate, GeoPoint, RadiusCountResult};

/// Slack added to the chord search radius so rounding differences between the
/// chord and haversine forms never drop a boundary target.
const CHORD_SLACK: f64 = 1e-9;

type IndexedTarget = GeomWithData<[f64; 3], Coordinate>;

/// Spatial index over the non-partial points of a target set.
pub struct TargetIndex {
    tree: RTree<IndexedTarget>,
    sphere: Sphere,
}

impl TargetIndex {
    /// Build the index. Partial targets are left out.
    pub fn build(sphere: Sphere, targets: &[GeoPoint]) -> Self {
        let entries: Vec<IndexedTarget> = targets
            .iter()
            .filter_map(GeoPoint::coordinate)
            .map(|c| GeomWithData::new(to_unit_vector(c), c))
            .collect();

        let tree = RTree::bulk_load(entries);
        debug!("Built target index with {} entries", tree.size());

        Self { tree, sphere }
    }

    /// Same contract as [`Sphere::count_within_radius`].
    pub fn count_within_radius(&self, reference: &GeoPoint, radius_miles: f64) -> RadiusCountResult {
        let count = match reference.coordinate() {
            Some(origin) => self.count_around(origin, radius_miles),
            None => 0,
        };

        RadiusCountResult {
            reference_id: reference.id.clone(),
            count,
        }
    }

    fn count_around(&self, origin: Coordinate, radius_miles: f64) -> usize {
        if radius_miles < 0.0 || radius_miles.is_nan() {
            return 0;
        }

        let angle = radius_miles / self.sphere.radius_miles;
        // Past half a great circle every point on the sphere is in range
        let chord = if angle >= std::f64::consts::PI {
            2.0
        } else {
            2.0 * (angle / 2.0).sin()
        };
        let search = chord + CHORD_SLACK;

        self.tree
            .locate_within_distance(to_unit_vector(origin), search * search)
            .filter(|entry| self.sphere.is_within(origin, entry.data, radius_miles))
            .count()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

fn to_unit_vector(c: Coordinate) -> [f64; 3] {
    let (lat, lon) = (c.lat().to_radians(), c.lon().to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
