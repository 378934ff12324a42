//! Nearest-target lookup.

use super::Sphere;
use crate::models::{GeoPoint, NearestMatchResult};

impl Sphere {
    /// Find the target closest to `reference`.
    ///
    /// Partial targets are skipped. When several targets share the minimum
    /// distance exactly, the first one in input order wins.
    pub fn find_nearest(&self, reference: &GeoPoint, targets: &[GeoPoint]) -> NearestMatchResult {
        let Some(origin) = reference.coordinate() else {
            return NearestMatchResult::absent(&reference.id);
        };

        let mut best: Option<(f64, &GeoPoint)> = None;
        for target in targets {
            let Some(coord) = target.coordinate() else {
                continue;
            };
            let d = self.distance(origin, coord);
            match best {
                Some((best_d, _)) if d >= best_d => {}
                _ => best = Some((d, target)),
            }
        }

        match best {
            Some((distance, target)) => NearestMatchResult {
                reference_id: reference.id.clone(),
                distance_miles: Some(distance),
                matched_id: Some(target.id.clone()),
                matched_name: target.name.clone(),
            },
            None => NearestMatchResult::absent(&reference.id),
        }
    }
}

/// [`Sphere::find_nearest`] on the Earth sphere.
pub fn find_nearest(reference: &GeoPoint, targets: &[GeoPoint]) -> NearestMatchResult {
    Sphere::EARTH.find_nearest(reference, targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(id: &str, lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(id, lat, lon).unwrap()
    }

    #[test]
    fn test_coincident_target() {
        let chicago = pt("17031", 41.85, -87.65);
        let target = pt("chi", 41.85, -87.65);
        let r = find_nearest(&chicago, &[target]);
        assert_eq!(r.distance_miles, Some(0.0));
        assert_eq!(r.matched_id.as_deref(), Some("chi"));
    }

    #[test]
    fn test_picks_minimum() {
        let reference = pt("ref", 0.0, 0.0);
        let targets = vec![
            pt("far", 0.0, 90.0).with_name("Far Park"),
            pt("near", 0.0, 1.0).with_name("Near Park"),
            pt("mid", 0.0, 10.0),
        ];
        let r = find_nearest(&reference, &targets);
        assert_eq!(r.matched_id.as_deref(), Some("near"));
        assert_eq!(r.matched_name.as_deref(), Some("Near Park"));
        let expected = 1.0_f64.to_radians() * 3956.0;
        assert!((r.distance_miles.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_targets_absent() {
        let r = find_nearest(&pt("ref", 10.0, 10.0), &[]);
        assert_eq!(r, NearestMatchResult::absent("ref"));

        let r = find_nearest(&GeoPoint::partial("ref"), &[]);
        assert!(r.is_absent());
        assert!(r.matched_id.is_none());
    }

    #[test]
    fn test_partial_reference_absent() {
        let r = find_nearest(&GeoPoint::partial("02999"), &[pt("t", 1.0, 1.0)]);
        assert_eq!(r.reference_id, "02999");
        assert!(r.is_absent());
        assert!(r.matched_id.is_none());
    }

    #[test]
    fn test_only_partial_targets_absent() {
        let r = find_nearest(&pt("ref", 0.0, 0.0), &[GeoPoint::partial("t")]);
        assert!(r.is_absent());
    }

    #[test]
    fn test_tie_goes_to_first() {
        let reference = pt("ref", 0.0, 0.0);
        // Mirror images across the equator are exactly equidistant
        let targets = vec![pt("north", 5.0, 3.0), pt("south", -5.0, 3.0)];
        let r = find_nearest(&reference, &targets);
        assert_eq!(r.matched_id.as_deref(), Some("north"));

        let reversed: Vec<_> = targets.into_iter().rev().collect();
        let r = find_nearest(&reference, &reversed);
        assert_eq!(r.matched_id.as_deref(), Some("south"));
    }

    #[test]
    fn test_duplicate_targets_first_wins() {
        let reference = pt("ref", 30.0, -100.0);
        let targets = vec![pt("a", 31.0, -101.0), pt("b", 31.0, -101.0)];
        assert_eq!(
            find_nearest(&reference, &targets).matched_id.as_deref(),
            Some("a")
        );
    }
}
