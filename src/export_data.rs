use std::io::Write;

use crate::{
    aggregator::NumberedSegment,
    config::OutputLayout,
    error::{FixerError, Result},
    import_data::DELIMITER,
    trajectory::Trajectory,
};

/// Writes numbered segments, one row per point.
pub struct SegmentWriter<W: Write> {
    writer: csv::Writer<W>,
    layout: OutputLayout,
}

impl<W: Write> SegmentWriter<W> {
    /// Creates the writer and writes the header right away, so an empty run
    /// still produces a well-formed file.
    pub fn new(output: W, layout: OutputLayout) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(output);
        match layout {
            OutputLayout::WithEntity => {
                writer.write_record(["driver_id", "id", "lat", "lng", "timestamp"])?
            }
            OutputLayout::Simple => writer.write_record(["id", "lat", "lng", "timestamp"])?,
        }
        Ok(SegmentWriter { writer, layout })
    }

    pub fn write_segment(&mut self, entity_id: &str, segment: &NumberedSegment) -> Result<()> {
        let id = segment.id.to_string();
        for point in &segment.segment.points {
            let lat = point.lat.to_string();
            let lng = point.lng.to_string();
            let t = point.t.to_string();
            match self.layout {
                OutputLayout::WithEntity => {
                    self.writer.write_record([entity_id, &*id, &*lat, &*lng, &*t])?
                }
                OutputLayout::Simple => self.writer.write_record([&*id, &*lat, &*lng, &*t])?,
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| FixerError::Io(e.into_error()))
    }
}

/// Writes one trajectory per line as `entity_id;lat;lng;lat;lng;...`,
/// ordered by timestamp. No header.
pub struct WideWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WideWriter<W> {
    pub fn new(output: W) -> Self {
        WideWriter {
            writer: csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .terminator(csv::Terminator::Any(b'\n'))
                .flexible(true)
                .has_headers(false)
                .from_writer(output),
        }
    }

    pub fn write_trajectory(&mut self, mut trajectory: Trajectory) -> Result<()> {
        trajectory.sort_by_timestamp();
        let mut row = Vec::with_capacity(1 + trajectory.points.len() * 2);
        row.push(trajectory.entity_id);
        for point in &trajectory.points {
            row.push(point.lat.to_string());
            row.push(point.lng.to_string());
        }
        self.writer.write_record(&row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
