//! Great-circle proximity between reference points and target sets.
//!
//! For every reference point (e.g. a county centroid) this finds the nearest
//! target in one set (e.g. national parks) or counts the targets of another
//! set (e.g. campgrounds) within a radius. Every query is a pure function of
//! its inputs, so batches can be spread across threads freely.

mod batch;
mod distance;
mod index;
mod nearest;
mod radius;

pub use batch::{index_all, index_all_with_progress, IndexMode, ProximityConfig, Strategy};
pub use distance::{great_circle_distance_miles, Sphere, EARTH_RADIUS_MILES};
pub use index::TargetIndex;
pub use nearest::find_nearest;
pub use radius::count_within_radius;
