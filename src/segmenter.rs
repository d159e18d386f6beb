use crate::{
    config::FixerConfig,
    trajectory::{Point, Segment, Trajectory},
    validity,
};

/// Splits one entity's log into coherent sub-trajectories.
///
/// Starting from the earliest unconsumed fix, it keeps a window of the
/// following fixes that could plausibly come next (close enough, later, and
/// not too much later) and greedily chains the nearest one. Fixes that jump
/// too far away (GPS teleports) never make it into a window for the current
/// chain and are left for a later chain instead.
///
/// The window is refilled against the fix being extended from, one step
/// behind the fix just chained, so a chain only keeps growing while there are
/// at least two candidates within `spatial_limit` of each other.
///
/// The points are never mutated or removed: the sorted slice is walked with
/// cursors, `points[window_start..window_end]` being the candidate window and
/// everything before `window_start` being consumed.
pub struct TrajectorySegmenter {
    spatial_limit: f64,
    time_limit: i64,
    min_boundary: f64,
}

impl TrajectorySegmenter {
    pub fn new(config: &FixerConfig) -> Self {
        TrajectorySegmenter {
            spatial_limit: config.spatial_limit,
            time_limit: config.time_limit,
            min_boundary: config.min_boundary,
        }
    }

    pub fn with_limits(spatial_limit: f64, time_limit: i64, min_boundary: f64) -> Self {
        TrajectorySegmenter {
            spatial_limit,
            time_limit,
            min_boundary,
        }
    }

    /// Sorts the trajectory by timestamp and splits it. Segments that do not
    /// pass the validity filter are dropped.
    pub fn fix_and_split(&self, mut trajectory: Trajectory) -> Vec<Segment> {
        trajectory.sort_by_timestamp();
        let candidates = self.split_sorted(&trajectory.points);
        let total = candidates.len();
        let segments: Vec<Segment> = candidates
            .into_iter()
            .filter(|segment| validity::is_valid(&segment.points, self.min_boundary))
            .collect();
        debug!(
            "entity {}: {} points, {} chains, {} kept",
            trajectory.entity_id,
            trajectory.points.len(),
            total,
            segments.len()
        );
        segments
    }

    /// The chaining pass itself, without the validity filter. `points` must
    /// be sorted ascending by timestamp.
    pub fn split_sorted(&self, points: &[Point]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut next = 0;
        while next < points.len() {
            let mut last = points[next];
            let mut chain = vec![last];
            let mut window_start = next + 1;
            let mut window_end = self.extend_window(points, &last, window_start);

            next = loop {
                if window_start >= window_end {
                    break window_end;
                }
                let closest = self.closest(points, &last, window_start, window_end);
                let candidate = points[closest];

                // the refill is still judged against the current `last`
                window_end = self.extend_window(points, &last, window_end);

                // everything not later than the chosen fix is superseded,
                // including fixes the refill just pulled in
                let mut superseded_end = closest + 1;
                while superseded_end < window_end && points[superseded_end].t <= candidate.t {
                    superseded_end += 1;
                }

                if last.distance(&candidate) >= self.spatial_limit {
                    // broken chain, the candidate and the rest of the window
                    // start over in the next chain
                    break closest;
                }
                chain.push(candidate);
                last = candidate;
                window_start = superseded_end;
            };

            segments.push(Segment { points: chain });
        }
        segments
    }

    fn can_follow(&self, last: &Point, candidate: &Point) -> bool {
        candidate.t > last.t
            && candidate.t.saturating_sub(last.t) < self.time_limit
            && candidate.distance(last) < self.spatial_limit
    }

    // Pulls points into the window starting at `from` and stops at the first
    // one that cannot follow `last`. Returns the new window end.
    fn extend_window(&self, points: &[Point], last: &Point, from: usize) -> usize {
        let mut end = from;
        while end < points.len() && self.can_follow(last, &points[end]) {
            end += 1;
        }
        end
    }

    // Ties go to the lowest index, which is the earliest timestamp and then
    // input order (the sort is stable).
    fn closest(&self, points: &[Point], last: &Point, start: usize, end: usize) -> usize {
        let mut best = start;
        let mut best_distance = last.distance(&points[start]);
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = last.distance(point);
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }
}
