use std::fmt;

use serde::Serialize;

/// Raw counters of a run. Everything else is derived from these on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// input points seen
    pub n_points: u64,
    /// points written out as part of a segment
    pub mantained_points: u64,
    /// trajectories produced by the grouper
    pub n_of_trajectories: u64,
    /// trajectories that passed the validity pre-check
    pub number_of_mantained_drivers: u64,
    /// segments written out
    pub end_n_of_trajectories: u64,
    /// sum of `max t - min t` over written segments
    pub total_time: i128,
    /// sum of `max t - min t` over grouped input trajectories
    pub input_total_time: i128,
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

impl RunStatistics {
    pub fn discarded_points(&self) -> u64 {
        self.n_points.saturating_sub(self.mantained_points)
    }

    pub fn discard_ratio(&self) -> Option<f64> {
        ratio(self.discarded_points() as f64, self.n_points as f64)
    }

    pub fn retained_trajectory_ratio(&self) -> Option<f64> {
        ratio(
            self.number_of_mantained_drivers as f64,
            self.n_of_trajectories as f64,
        )
    }

    /// Average time between consecutive input points of the same trajectory.
    pub fn mean_interval_before(&self) -> Option<f64> {
        ratio(
            self.input_total_time as f64,
            self.n_points.saturating_sub(self.n_of_trajectories) as f64,
        )
    }

    /// Average time between consecutive points of the same output segment.
    pub fn mean_interval_after(&self) -> Option<f64> {
        ratio(
            self.total_time as f64,
            self.mantained_points
                .saturating_sub(self.end_n_of_trajectories) as f64,
        )
    }

    pub fn mean_segments_per_trajectory(&self) -> Option<f64> {
        ratio(
            self.end_n_of_trajectories as f64,
            self.number_of_mantained_drivers as f64,
        )
    }

    pub fn snapshot(&self, elapsed_seconds: i64) -> StatisticsSnapshot {
        StatisticsSnapshot {
            counters: *self,
            discarded_points: self.discarded_points(),
            discard_ratio: self.discard_ratio(),
            retained_trajectory_ratio: self.retained_trajectory_ratio(),
            mean_interval_before: self.mean_interval_before(),
            mean_interval_after: self.mean_interval_after(),
            mean_segments_per_trajectory: self.mean_segments_per_trajectory(),
            elapsed_seconds,
        }
    }
}

/// Counters plus every derived metric, computed once at the time the snapshot
/// is taken. Undefined ratios are `None` (`null` in JSON).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    #[serde(flatten)]
    pub counters: RunStatistics,
    pub discarded_points: u64,
    pub discard_ratio: Option<f64>,
    pub retained_trajectory_ratio: Option<f64>,
    pub mean_interval_before: Option<f64>,
    pub mean_interval_after: Option<f64>,
    pub mean_segments_per_trajectory: Option<f64>,
    pub elapsed_seconds: i64,
}

struct Metric(Option<f64>);

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.4}", value),
            None => write!(f, "undefined"),
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "points: {} ({} kept, {} discarded, ratio {})",
            self.n_points,
            self.mantained_points,
            self.discarded_points(),
            Metric(self.discard_ratio())
        )?;
        writeln!(
            f,
            "trajectories: {} ({} kept, ratio {})",
            self.n_of_trajectories,
            self.number_of_mantained_drivers,
            Metric(self.retained_trajectory_ratio())
        )?;
        writeln!(f, "segments: {}", self.end_n_of_trajectories)?;
        write!(
            f,
            "mean interval: {} before, {} after",
            Metric(self.mean_interval_before()),
            Metric(self.mean_interval_after())
        )
    }
}
