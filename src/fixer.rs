use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::{
    aggregator::Aggregator,
    config::FixerConfig,
    export_data::{SegmentWriter, WideWriter},
    grouper::TrajectoryGrouper,
    import_data::RecordReader,
    progress::{format_elapsed, ProgressReporter, StopWatch},
    segmenter::TrajectorySegmenter,
    statistics::RunStatistics,
    validity,
};

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub statistics: RunStatistics,
    pub skipped_rows: u64,
    /// The run was stopped early. Everything written so far is complete.
    pub cancelled: bool,
    pub elapsed: TimeDelta,
}

/// Runs the whole cleaning pass: records are grouped into per-entity runs,
/// each run is pre-checked, segmented and numbered, and written out before
/// the next run is read.
pub struct TrajectoryFixer {
    config: FixerConfig,
    segmenter: TrajectorySegmenter,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TrajectoryFixer {
    pub fn new(config: FixerConfig) -> Self {
        let segmenter = TrajectorySegmenter::new(&config);
        TrajectoryFixer {
            config,
            segmenter,
            cancel_flag: None,
        }
    }

    /// When the flag is set the run stops after the entity being processed
    /// has been written.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn run<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        progress: &mut dyn ProgressReporter,
        total_units: Option<u64>,
    ) -> Result<RunSummary> {
        self.config.validate()?;
        let watch = StopWatch::start();
        let mut writer = SegmentWriter::new(output, self.config.output_layout)?;
        let mut aggregator = Aggregator::new();
        let mut grouper = TrajectoryGrouper::new(RecordReader::new(
            input,
            self.config.columns,
            self.config.row_policy,
        )?);

        let mut done = 0_u64;
        let mut cancelled = false;
        progress.report(done, total_units);

        for trajectory in grouper.by_ref() {
            let trajectory = trajectory?;
            done += trajectory.points.len() as u64;
            let entity_id = trajectory.entity_id.clone();

            let retained = validity::is_valid(&trajectory.points, self.config.min_boundary);
            aggregator.add_trajectory(&trajectory, retained);
            if retained {
                let segments = self.segmenter.fix_and_split(trajectory);
                for segment in aggregator.add_segments(segments) {
                    writer.write_segment(&entity_id, &segment)?;
                }
                writer.flush()?;
            } else {
                debug!("entity {}: skipped by pre-check", entity_id);
            }
            progress.report(done, total_units);

            if self.is_cancelled() {
                warn!("cancelled after entity {}", entity_id);
                cancelled = true;
                break;
            }
        }
        // flushes and hands the output back
        writer.into_inner()?;

        if !cancelled && total_units != Some(done) {
            // skipped rows never count as done, so close the run off
            let total = total_units.map_or(done, |total| total.max(done));
            progress.report(total, Some(total));
        }

        let summary = RunSummary {
            statistics: *aggregator.statistics(),
            skipped_rows: grouper.get_ref().skipped_rows(),
            cancelled,
            elapsed: watch.elapsed(),
        };
        info!(
            "done in {}: {} segments from {} trajectories",
            format_elapsed(summary.elapsed),
            summary.statistics.end_n_of_trajectories,
            summary.statistics.n_of_trajectories
        );
        Ok(summary)
    }

    pub fn fix_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        progress: &mut dyn ProgressReporter,
        total_units: Option<u64>,
    ) -> Result<RunSummary> {
        let input = File::open(input_path)
            .with_context(|| format!("cannot open input {}", input_path.display()))?;
        let output = File::create(output_path)
            .with_context(|| format!("cannot create output {}", output_path.display()))?;
        info!(
            "fixing {} => {}",
            input_path.display(),
            output_path.display()
        );
        self.run(
            BufReader::new(input),
            BufWriter::new(output),
            progress,
            total_units,
        )
    }
}

/// Streams entity runs into the one-line-per-entity format. Returns the
/// number of lines written.
pub fn convert<R: Read, W: Write>(input: R, output: W, config: &FixerConfig) -> Result<u64> {
    config.validate()?;
    let mut writer = WideWriter::new(output);
    let grouper = TrajectoryGrouper::new(RecordReader::new(
        input,
        config.columns,
        config.row_policy,
    )?);
    let mut lines = 0;
    for trajectory in grouper {
        writer.write_trajectory(trajectory?)?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

pub fn convert_file(input_path: &Path, output_path: &Path, config: &FixerConfig) -> Result<u64> {
    let input = File::open(input_path)
        .with_context(|| format!("cannot open input {}", input_path.display()))?;
    let output = File::create(output_path)
        .with_context(|| format!("cannot create output {}", output_path.display()))?;
    info!(
        "converting {} => {}",
        input_path.display(),
        output_path.display()
    );
    convert(BufReader::new(input), BufWriter::new(output), config)
}

/// `<dir>/<prefix><file name>`, next to the input.
pub fn default_output_path(input_path: &Path, prefix: &str) -> Result<PathBuf> {
    let file_name = input_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("input path has no file name: {}", input_path.display()))?;
    Ok(input_path.with_file_name(format!("{}{}", prefix, file_name)))
}

#[cfg(test)]
mod tests {
    use super::default_output_path;
    use std::path::Path;

    #[test]
    fn output_names() {
        assert_eq!(
            default_output_path(Path::new("data/taxi.csv"), "fixed_").unwrap(),
            Path::new("data/fixed_taxi.csv")
        );
        assert_eq!(
            default_output_path(Path::new("taxi.csv"), "converted_").unwrap(),
            Path::new("converted_taxi.csv")
        );
        assert!(default_output_path(Path::new("/"), "fixed_").is_err());
    }
}
