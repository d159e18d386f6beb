use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::{
    config::{ColumnMapping, RowPolicy},
    error::{FixerError, Result},
    trajectory::Point,
};

pub const DELIMITER: u8 = b';';

/// One input row after column mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub entity_id: String,
    pub point: Point,
}

fn parse_record(row: &csv::StringRecord, columns: &ColumnMapping, line: u64) -> Result<Record> {
    if row.len() != columns.field_count {
        return Err(FixerError::parse(
            line,
            format!("expected {} fields, found {}", columns.field_count, row.len()),
        ));
    }
    // `RecordReader::new` validated the mapping, so every index is below
    // `field_count`
    let entity_id = &row[columns.entity];
    if entity_id.is_empty() {
        return Err(FixerError::parse(line, "empty entity id"));
    }
    let coordinate = |index: usize, name: &str| -> Result<f64> {
        match row[index].parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(FixerError::parse(
                line,
                format!("invalid {}: {:?}", name, &row[index]),
            )),
        }
    };
    let lat = coordinate(columns.lat, "latitude")?;
    let lng = coordinate(columns.lng, "longitude")?;
    let t = row[columns.timestamp].parse::<i64>().map_err(|_| {
        FixerError::parse(
            line,
            format!("invalid timestamp: {:?}", &row[columns.timestamp]),
        )
    })?;
    Ok(Record {
        entity_id: entity_id.to_owned(),
        point: Point::new(lat, lng, t),
    })
}

/// Streams records out of semicolon-delimited text, in file order. The
/// header line is skipped.
pub struct RecordReader<R: Read> {
    rows: csv::StringRecordsIntoIter<R>,
    columns: ColumnMapping,
    policy: RowPolicy,
    // data rows seen so far, used when the csv reader has no position
    row_counter: u64,
    skipped_rows: u64,
}

impl<R: Read> RecordReader<R> {
    /// Fails with `FixerError::Config` if `columns` does not describe a valid
    /// row layout.
    pub fn new(input: R, columns: ColumnMapping, policy: RowPolicy) -> Result<Self> {
        columns.validate()?;
        let rows = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input)
            .into_records();
        Ok(RecordReader {
            rows,
            columns,
            policy,
            row_counter: 0,
            skipped_rows: 0,
        })
    }

    pub fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }

    fn skip_or_fail(&mut self, error: FixerError) -> Option<Result<Record>> {
        match self.policy {
            RowPolicy::FailFast => Some(Err(error)),
            RowPolicy::SkipAndLog => {
                warn!("skipping row: {}", error);
                self.skipped_rows += 1;
                None
            }
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = self.rows.next()?;
            self.row_counter += 1;
            let fallback_line = self.row_counter + 1;
            let result = match row {
                Ok(row) => {
                    let line = row.position().map_or(fallback_line, |p| p.line());
                    parse_record(&row, &self.columns, line)
                }
                // a broken stream is never a row problem
                Err(e) if e.is_io_error() => return Some(Err(FixerError::Csv(e))),
                Err(e) => {
                    let line = e.position().map_or(fallback_line, |p| p.line());
                    Err(FixerError::parse(line, e.to_string()))
                }
            };
            match result {
                Ok(record) => return Some(Ok(record)),
                Err(error) => {
                    if let Some(failure) = self.skip_or_fail(error) {
                        return Some(failure);
                    }
                }
            }
        }
    }
}

/// Number of data rows in a file (lines minus the header). Only used as the
/// progress total, so blank lines are not worth special handling.
pub fn count_records(path: &Path) -> Result<u64> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = 0_u64;
    for line in reader.split(b'\n') {
        line?;
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str, policy: RowPolicy) -> Vec<Result<Record>> {
        RecordReader::new(input.as_bytes(), ColumnMapping::FOUR_FIELDS, policy)
            .unwrap()
            .collect()
    }

    #[test]
    fn four_fields() {
        let records = read_all(
            "id;lat;lng;timestamp\n7;45.1;9.2;1000\n7;45.2;9.3;2000\n",
            RowPolicy::FailFast,
        );
        assert_eq!(records.len(), 2);
        let first = records[0].as_ref().unwrap();
        assert_eq!(first.entity_id, "7");
        assert_eq!(first.point, Point::new(45.1, 9.2, 1000));
    }

    #[test]
    fn five_fields() {
        let records: Vec<Record> = RecordReader::new(
            "driver_id;id;lat;lng;timestamp\n3;12;1.5;2.5;99\n".as_bytes(),
            ColumnMapping::FIVE_FIELDS,
            RowPolicy::FailFast,
        )
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
        assert_eq!(
            records,
            vec![Record {
                entity_id: "12".to_owned(),
                point: Point::new(1.5, 2.5, 99)
            }]
        );
    }

    #[test]
    fn header_only() {
        assert!(read_all("id;lat;lng;timestamp\n", RowPolicy::FailFast).is_empty());
        assert!(read_all("", RowPolicy::FailFast).is_empty());
    }

    #[test]
    fn fail_fast() {
        let records = read_all(
            "id;lat;lng;timestamp\n1;1.0;1.0;1\n1;abc;1.0;2\n1;1.0;1.0;3\n",
            RowPolicy::FailFast,
        );
        assert!(records[0].is_ok());
        match &records[1] {
            Err(FixerError::Parse { line, .. }) => assert_eq!(*line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn skip_and_log() {
        let input = "id;lat;lng;timestamp\n1;1.0;1.0;1\n1;NaN;1.0;2\n1;1.0\n1;1.0;1.0;x\n1;1.0;1.0;3\n";
        let mut reader =
            RecordReader::new(input.as_bytes(), ColumnMapping::FOUR_FIELDS, RowPolicy::SkipAndLog)
                .unwrap();
        let timestamps: Vec<i64> = reader.by_ref().map(|r| r.unwrap().point.t).collect();
        assert_eq!(timestamps, vec![1, 3]);
        assert_eq!(reader.skipped_rows(), 3);
    }

    #[test]
    fn out_of_range_mapping_is_rejected() {
        let columns = ColumnMapping {
            timestamp: 9,
            ..ColumnMapping::FOUR_FIELDS
        };
        let result = RecordReader::new(
            "id;lat;lng;timestamp\n1;1;1;1\n".as_bytes(),
            columns,
            RowPolicy::SkipAndLog,
        );
        assert!(matches!(result, Err(FixerError::Config(_))));
    }
}
