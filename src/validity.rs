use crate::trajectory::{BoundingBox, Point};

/// A point sequence is worth keeping only if it moves more than
/// `min_boundary` degrees along at least one axis. Empty input is invalid.
pub fn is_valid(points: &[Point], min_boundary: f64) -> bool {
    match BoundingBox::of(points) {
        None => false,
        Some(bbox) => bbox.lat_extent() > min_boundary || bbox.lng_extent() > min_boundary,
    }
}
