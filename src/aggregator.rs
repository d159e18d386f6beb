use crate::{
    statistics::RunStatistics,
    trajectory::{duration_of, Segment, Trajectory},
};

/// A segment with its run-wide id.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberedSegment {
    pub id: u64,
    pub segment: Segment,
}

/// Owns the output id counter and the run statistics. There is exactly one
/// per run and every entity result is folded through it, in input order.
pub struct Aggregator {
    next_id: u64,
    statistics: RunStatistics,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            next_id: 0,
            statistics: RunStatistics::default(),
        }
    }

    /// Accounts for a grouped input trajectory, whether or not it passed the
    /// pre-check.
    pub fn add_trajectory(&mut self, trajectory: &Trajectory, retained: bool) {
        self.statistics.n_points += trajectory.points.len() as u64;
        self.statistics.n_of_trajectories += 1;
        self.statistics.input_total_time += duration_of(&trajectory.points);
        if retained {
            self.statistics.number_of_mantained_drivers += 1;
        }
    }

    /// Numbers the segments of one entity, in the order they were produced.
    pub fn add_segments(&mut self, segments: Vec<Segment>) -> Vec<NumberedSegment> {
        segments
            .into_iter()
            .map(|segment| {
                let id = self.next_id;
                self.next_id += 1;
                self.statistics.mantained_points += segment.len() as u64;
                self.statistics.end_n_of_trajectories += 1;
                self.statistics.total_time += segment.duration();
                NumberedSegment { id, segment }
            })
            .collect()
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }
}
