//! Core value types for proximity queries.

pub mod point;
pub mod result;

pub use point::{Coordinate, GeoPoint, ValidationError};
pub use result::{NearestMatchResult, ProximityResult, RadiusCountResult};
