use crate::{
    error::Result,
    import_data::Record,
    trajectory::Trajectory,
};

/// Turns a record stream into one `Trajectory` per contiguous run of the same
/// entity id.
///
/// Only one run is buffered at a time, so memory is bounded by the largest
/// run. An id that shows up again after a different id starts a new,
/// independent trajectory: runs are never merged.
///
/// A record error is passed through as soon as it is seen and the partially
/// buffered run is dropped, since it can no longer be known to be complete.
pub struct TrajectoryGrouper<I> {
    records: I,
    // first record of the next run, read while closing the previous one
    pending: Option<Record>,
    finished: bool,
}

impl<I> TrajectoryGrouper<I>
where
    I: Iterator<Item = Result<Record>>,
{
    pub fn new(records: I) -> Self {
        TrajectoryGrouper {
            records,
            pending: None,
            finished: false,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.records
    }

    fn next_record(&mut self) -> Option<Result<Record>> {
        if self.finished {
            return None;
        }
        let record = self.records.next();
        if record.is_none() {
            self.finished = true;
        }
        record
    }
}

impl<I> Iterator for TrajectoryGrouper<I>
where
    I: Iterator<Item = Result<Record>>,
{
    type Item = Result<Trajectory>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.pending.take() {
            Some(record) => record,
            None => match self.next_record()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            },
        };

        let mut trajectory = Trajectory::new(first.entity_id);
        trajectory.points.push(first.point);
        loop {
            match self.next_record() {
                None => break,
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(record)) => {
                    if record.entity_id == trajectory.entity_id {
                        trajectory.points.push(record.point);
                    } else {
                        self.pending = Some(record);
                        break;
                    }
                }
            }
        }
        Some(Ok(trajectory))
    }
}
