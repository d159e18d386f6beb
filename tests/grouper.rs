use trajectory_fixer::config::{ColumnMapping, RowPolicy};
use trajectory_fixer::grouper::TrajectoryGrouper;
use trajectory_fixer::import_data::{Record, RecordReader};
use trajectory_fixer::{FixerError, Point, Trajectory};

fn record(id: &str, t: i64) -> Result<Record, FixerError> {
    Ok(Record {
        entity_id: id.to_owned(),
        point: Point::new(0.0, 0.0, t),
    })
}

fn summary(trajectories: &[Trajectory]) -> Vec<(String, Vec<i64>)> {
    trajectories
        .iter()
        .map(|t| {
            (
                t.entity_id.clone(),
                t.points.iter().map(|p| p.t).collect(),
            )
        })
        .collect()
}

#[test]
fn contiguous_runs() {
    let records = vec![
        record("a", 3),
        record("a", 1),
        record("b", 5),
        record("c", 7),
        record("c", 8),
        record("c", 6),
    ];
    let trajectories: Vec<Trajectory> = TrajectoryGrouper::new(records.into_iter())
        .map(|t| t.unwrap())
        .collect();
    assert_eq!(
        summary(&trajectories),
        vec![
            ("a".to_owned(), vec![3, 1]),
            ("b".to_owned(), vec![5]),
            ("c".to_owned(), vec![7, 8, 6]),
        ]
    );
}

#[test]
fn reappearing_id_is_a_new_trajectory() {
    let records = vec![
        record("a", 1),
        record("b", 2),
        record("a", 3),
        record("a", 4),
    ];
    let trajectories: Vec<Trajectory> = TrajectoryGrouper::new(records.into_iter())
        .map(|t| t.unwrap())
        .collect();
    assert_eq!(
        summary(&trajectories),
        vec![
            ("a".to_owned(), vec![1]),
            ("b".to_owned(), vec![2]),
            ("a".to_owned(), vec![3, 4]),
        ]
    );
}

#[test]
fn empty_stream() {
    let mut grouper = TrajectoryGrouper::new(Vec::<Result<Record, FixerError>>::new().into_iter());
    assert!(grouper.next().is_none());
    assert!(grouper.next().is_none());
}

#[test]
fn error_drops_the_open_run() {
    let records = vec![
        record("a", 1),
        record("b", 2),
        Err(FixerError::parse(4, "bad")),
        record("b", 3),
    ];
    let mut grouper = TrajectoryGrouper::new(records.into_iter());
    assert_eq!(grouper.next().unwrap().unwrap().entity_id, "a");
    assert!(matches!(
        grouper.next(),
        Some(Err(FixerError::Parse { line: 4, .. }))
    ));
}

#[test]
fn from_text() {
    let input = "id;lat;lng;timestamp\n1;45.0;9.0;10\n1;45.1;9.1;20\n2;46.0;8.0;5\n";
    let grouper = TrajectoryGrouper::new(RecordReader::new(
        input.as_bytes(),
        ColumnMapping::FOUR_FIELDS,
        RowPolicy::FailFast,
    )
    .unwrap());
    let trajectories: Vec<Trajectory> = grouper.map(|t| t.unwrap()).collect();
    assert_eq!(trajectories.len(), 2);
    assert_eq!(
        trajectories[0].points,
        vec![Point::new(45.0, 9.0, 10), Point::new(45.1, 9.1, 20)]
    );
    assert_eq!(trajectories[1].entity_id, "2");
}

#[test]
fn skipped_rows_are_counted() {
    let input = "id;lat;lng;timestamp\n1;45.0;9.0;10\nbroken\n1;45.1;9.1;20\n";
    let mut grouper = TrajectoryGrouper::new(RecordReader::new(
        input.as_bytes(),
        ColumnMapping::FOUR_FIELDS,
        RowPolicy::SkipAndLog,
    )
    .unwrap());
    let trajectory = grouper.next().unwrap().unwrap();
    assert_eq!(trajectory.points.len(), 2);
    assert!(grouper.next().is_none());
    assert_eq!(grouper.get_ref().skipped_rows(), 1);
}
