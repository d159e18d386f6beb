use itertools::{Itertools, MinMaxResult};

/// A single GPS fix. `t` is in whatever monotonic unit the input uses
/// (usually epoch milliseconds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
    pub t: i64,
}

impl Point {
    pub fn new(lat: f64, lng: f64, t: i64) -> Self {
        Point { lat, lng, t }
    }

    // NOTE: this is a planar approximation over raw degrees, not a geodesic
    // distance. Thresholds are expressed in the same unit.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

/// All the fixes of one entity run as they came out of the input. No ordering
/// is guaranteed until the segmenter sorts them.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub entity_id: String,
    pub points: Vec<Point>,
}

impl Trajectory {
    pub fn new(entity_id: String) -> Self {
        Trajectory {
            entity_id,
            points: Vec::new(),
        }
    }

    pub fn sort_by_timestamp(&mut self) {
        // stable, so equal timestamps keep their input order
        self.points.sort_by_key(|p| p.t);
    }
}

/// A cleaned sub-trajectory: strictly increasing timestamps, every hop within
/// the spatial and time limits.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub points: Vec<Point>,
}

impl Segment {
    pub fn duration(&self) -> i128 {
        duration_of(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// `max t - min t`, zero for fewer than two points. Widened so that any two
/// `i64` timestamps fit.
pub fn duration_of(points: &[Point]) -> i128 {
    match points.iter().map(|p| p.t).minmax() {
        MinMaxResult::MinMax(min, max) => i128::from(max) - i128::from(min),
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn of(points: &[Point]) -> Option<BoundingBox> {
        let first = points.first()?;
        let init = BoundingBox {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        Some(points[1..].iter().fold(init, |b, p| BoundingBox {
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
            min_lng: b.min_lng.min(p.lng),
            max_lng: b.max_lng.max(p.lng),
        }))
    }

    pub fn lat_extent(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_extent(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}
