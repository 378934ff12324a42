//! Batch proximity queries over a whole reference set.

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Sphere, TargetIndex};
use crate::models::{GeoPoint, ProximityResult, ValidationError};

/// Which query to run for every reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexMode {
    /// Distance to the closest target.
    Nearest,
    /// Number of targets within `radius_miles`, boundary included.
    WithinRadius { radius_miles: f64 },
}

impl IndexMode {
    /// Radius mode with a checked radius. Zero is allowed.
    pub fn within_radius(radius_miles: f64) -> Result<Self, ValidationError> {
        if !radius_miles.is_finite() || radius_miles < 0.0 {
            return Err(ValidationError::InvalidRadius(radius_miles));
        }
        Ok(IndexMode::WithinRadius { radius_miles })
    }
}

/// How targets are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Compare every reference against every target.
    #[default]
    BruteForce,
    /// Use an R-tree for radius counts. Nearest queries still scan, to keep
    /// the first-in-order tie-break exact.
    #[serde(alias = "rtree")]
    RTree,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brute-force" | "brute_force" => Ok(Strategy::BruteForce),
            "rtree" | "r-tree" => Ok(Strategy::RTree),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Settings for [`index_all`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityConfig {
    pub sphere: Sphere,
    pub strategy: Strategy,
    /// Spread reference points over the rayon thread pool.
    pub parallel: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            sphere: Sphere::EARTH,
            strategy: Strategy::BruteForce,
            parallel: true,
        }
    }
}

/// Run `mode` for every reference point against the full target set.
///
/// Returns exactly one result per reference, in reference order. Partial
/// references produce an absent nearest result or a zero count.
pub fn index_all(
    references: &[GeoPoint],
    targets: &[GeoPoint],
    mode: IndexMode,
    config: &ProximityConfig,
) -> Vec<ProximityResult> {
    index_all_with_progress(references, targets, mode, config, |_| {})
}

/// Like [`index_all`], calling `on_done` with the position of each finished
/// reference. With `parallel` set the calls arrive from worker threads in no
/// particular order.
pub fn index_all_with_progress<F>(
    references: &[GeoPoint],
    targets: &[GeoPoint],
    mode: IndexMode,
    config: &ProximityConfig,
    on_done: F,
) -> Vec<ProximityResult>
where
    F: Fn(usize) + Sync,
{
    let usable_targets = targets.iter().filter(|t| !t.is_partial()).count();
    let partial_refs = references.iter().filter(|r| r.is_partial()).count();

    info!(
        "Indexing {} reference points ({} without coordinates) against {} targets ({:?})",
        references.len(),
        partial_refs,
        usable_targets,
        mode
    );
    if usable_targets == 0 {
        warn!("Target set has no usable coordinates; every result will be empty");
    }

    let query = Query::new(targets, mode, config);
    let run = |(i, reference): (usize, &GeoPoint)| {
        let result = query.run(reference);
        on_done(i);
        result
    };

    if config.parallel {
        references.par_iter().enumerate().map(run).collect()
    } else {
        references.iter().enumerate().map(run).collect()
    }
}

/// A mode bound to its targets, with any index built up front.
struct Query<'a> {
    targets: &'a [GeoPoint],
    mode: IndexMode,
    sphere: Sphere,
    index: Option<TargetIndex>,
}

impl<'a> Query<'a> {
    fn new(targets: &'a [GeoPoint], mode: IndexMode, config: &ProximityConfig) -> Self {
        let index = match (mode, config.strategy) {
            (IndexMode::WithinRadius { .. }, Strategy::RTree) => {
                Some(TargetIndex::build(config.sphere, targets))
            }
            _ => None,
        };

        Self {
            targets,
            mode,
            sphere: config.sphere,
            index,
        }
    }

    fn run(&self, reference: &GeoPoint) -> ProximityResult {
        match self.mode {
            IndexMode::Nearest => {
                ProximityResult::Nearest(self.sphere.find_nearest(reference, self.targets))
            }
            IndexMode::WithinRadius { radius_miles } => {
                let result = match &self.index {
                    Some(index) => index.count_within_radius(reference, radius_miles),
                    None => self
                        .sphere
                        .count_within_radius(reference, self.targets, radius_miles),
                };
                ProximityResult::RadiusCount(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::radius::tests::north_of_origin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pt(id: &str, lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(id, lat, lon).unwrap()
    }

    fn sequential() -> ProximityConfig {
        ProximityConfig {
            parallel: false,
            ..ProximityConfig::default()
        }
    }

    #[test]
    fn test_within_radius_validation() {
        assert!(IndexMode::within_radius(30.0).is_ok());
        assert!(IndexMode::within_radius(0.0).is_ok());
        assert_eq!(
            IndexMode::within_radius(-1.0),
            Err(ValidationError::InvalidRadius(-1.0))
        );
        assert!(IndexMode::within_radius(f64::NAN).is_err());
        assert!(IndexMode::within_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("rtree".parse::<Strategy>(), Ok(Strategy::RTree));
        assert_eq!("brute-force".parse::<Strategy>(), Ok(Strategy::BruteForce));
        assert!("kdtree".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_nearest_mixed_references() {
        let references = vec![pt("A", 40.0, -105.0), GeoPoint::partial("B")];
        let targets = vec![
            pt("T1", 40.3, -105.6).with_name("Rocky Mountain"),
            pt("T2", 36.1, -112.1).with_name("Grand Canyon"),
        ];

        let results = index_all(&references, &targets, IndexMode::Nearest, &sequential());
        assert_eq!(results.len(), 2);

        let a = results[0].as_nearest().unwrap();
        assert_eq!(a.reference_id, "A");
        assert_eq!(a.matched_id.as_deref(), Some("T1"));
        assert_eq!(a.matched_name.as_deref(), Some("Rocky Mountain"));
        assert!(a.distance_miles.unwrap() > 0.0);

        let b = results[1].as_nearest().unwrap();
        assert_eq!(b.reference_id, "B");
        assert!(b.distance_miles.is_none());
        assert!(b.matched_id.is_none());
    }

    #[test]
    fn test_radius_mode_partial_is_zero() {
        let references = vec![pt("ref", 0.0, 0.0), GeoPoint::partial("gap")];
        let targets: Vec<_> = [5.0, 15.0, 29.99, 30.01]
            .iter()
            .map(|d| north_of_origin("c", *d))
            .collect();
        let mode = IndexMode::within_radius(30.0).unwrap();

        for strategy in [Strategy::BruteForce, Strategy::RTree] {
            let config = ProximityConfig {
                strategy,
                ..sequential()
            };
            let results = index_all(&references, &targets, mode, &config);
            assert_eq!(results[0].as_radius_count().unwrap().count, 3);
            let gap = results[1].as_radius_count().unwrap();
            assert_eq!(gap.reference_id, "gap");
            assert_eq!(gap.count, 0);
        }
    }

    #[test]
    fn test_empty_targets() {
        let references = vec![pt("a", 1.0, 1.0), GeoPoint::partial("b")];
        let results = index_all(&references, &[], IndexMode::Nearest, &sequential());
        assert!(results.iter().all(|r| r.as_nearest().unwrap().is_absent()));

        let mode = IndexMode::within_radius(30.0).unwrap();
        let results = index_all(&references, &[], mode, &sequential());
        assert!(results
            .iter()
            .all(|r| r.as_radius_count().unwrap().count == 0));
    }

    #[test]
    fn test_parallel_matches_sequential_and_keeps_order() {
        let references: Vec<_> = (0..500)
            .map(|i| {
                if i % 37 == 0 {
                    GeoPoint::partial(format!("{:05}", i))
                } else {
                    let lat = 25.0 + (i as f64 * 0.047) % 24.0;
                    let lon = -124.0 + (i as f64 * 0.113) % 57.0;
                    pt(&format!("{:05}", i), lat, lon)
                }
            })
            .collect();
        let targets: Vec<_> = (0..300)
            .map(|i| {
                let lat = 25.0 + (i as f64 * 0.081) % 24.0;
                let lon = -124.0 + (i as f64 * 0.191) % 57.0;
                pt(&format!("t{}", i), lat, lon)
            })
            .collect();

        for mode in [IndexMode::Nearest, IndexMode::within_radius(60.0).unwrap()] {
            let seq = index_all(&references, &targets, mode, &sequential());
            let par = index_all(
                &references,
                &targets,
                mode,
                &ProximityConfig {
                    strategy: Strategy::RTree,
                    ..ProximityConfig::default()
                },
            );
            assert_eq!(seq, par);
            for (result, reference) in par.iter().zip(&references) {
                assert_eq!(result.reference_id(), reference.id);
            }
        }
    }

    #[test]
    fn test_progress_called_once_per_reference() {
        let references: Vec<_> = (0..64).map(|i| pt(&i.to_string(), 10.0, 10.0)).collect();
        let targets = vec![pt("t", 10.5, 10.5)];
        let seen = AtomicUsize::new(0);

        let results = index_all_with_progress(
            &references,
            &targets,
            IndexMode::Nearest,
            &ProximityConfig::default(),
            |_| {
                seen.fetch_add(1, Ordering::Relaxed);
            },
        );

        assert_eq!(results.len(), 64);
        assert_eq!(seen.load(Ordering::Relaxed), 64);
    }
}
