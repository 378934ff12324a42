//! Geoprox - great-circle proximity features for county-level datasets.
//!
//! The library computes, for each reference point, the nearest target and
//! the number of targets within a radius. The `enrich` binary joins those
//! results onto a per-county CSV.

pub mod models;
pub mod proximity;

pub use models::{
    GeoPoint, NearestMatchResult, ProximityResult, RadiusCountResult, ValidationError,
};
pub use proximity::{
    count_within_radius, find_nearest, great_circle_distance_miles, index_all, IndexMode,
    ProximityConfig, Sphere,
};
