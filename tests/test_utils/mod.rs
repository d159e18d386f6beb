#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use trajectory_fixer::{
    fixer::RunSummary, progress::NoopProgress, FixerConfig, Point, TrajectoryFixer,
};

pub const HEADER: &str = "id;lat;lng;timestamp\n";

/// `n` points moving north-east by `step` degrees every `interval` ms.
pub fn straight_track(start: Point, n: usize, step: f64, interval: i64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            Point::new(
                start.lat + step * i as f64,
                start.lng + step * 0.5 * i as f64,
                start.t + interval * i as i64,
            )
        })
        .collect()
}

/// A driving-like track with jitter, occasional teleports and gaps.
pub fn noisy_track(rng: &mut StdRng, n: usize) -> Vec<Point> {
    let mut lat = rng.random_range(44.0..46.0);
    let mut lng = rng.random_range(8.0..10.0);
    let mut t: i64 = rng.random_range(1_600_000_000_000..1_700_000_000_000);
    let mut points = Vec::with_capacity(n);
    for _ in 0..n {
        lat += rng.random_range(-0.0002..0.0012);
        lng += rng.random_range(-0.0002..0.0012);
        t += rng.random_range(500..6000);
        let roll: f64 = rng.random();
        if roll < 0.03 {
            // teleport, the track itself does not move
            points.push(Point::new(
                lat + rng.random_range(-1.0..1.0),
                lng + rng.random_range(-1.0..1.0),
                t,
            ));
        } else if roll < 0.05 {
            t += 60_000;
            points.push(Point::new(lat, lng, t));
        } else {
            points.push(Point::new(lat, lng, t));
        }
    }
    points
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn to_csv(entities: &[(&str, Vec<Point>)]) -> String {
    let mut csv = HEADER.to_owned();
    for (id, points) in entities {
        for p in points {
            csv.push_str(&format!("{};{};{};{}\n", id, p.lat, p.lng, p.t));
        }
    }
    csv
}

pub fn run(input: &str, config: FixerConfig) -> (String, RunSummary) {
    let mut output = Vec::new();
    let summary = TrajectoryFixer::new(config)
        .run(input.as_bytes(), &mut output, &mut NoopProgress, None)
        .unwrap();
    (String::from_utf8(output).unwrap(), summary)
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputRow {
    pub entity_id: String,
    pub id: u64,
    pub point: Point,
}

/// Parses the `driver_id;id;lat;lng;timestamp` output.
pub fn parse_output(output: &str) -> Vec<OutputRow> {
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("driver_id;id;lat;lng;timestamp"));
    lines
        .map(|line| {
            let fields: Vec<&str> = line.split(';').collect();
            assert_eq!(fields.len(), 5, "bad line {line}");
            OutputRow {
                entity_id: fields[0].to_owned(),
                id: fields[1].parse().unwrap(),
                point: Point::new(
                    fields[2].parse().unwrap(),
                    fields[3].parse().unwrap(),
                    fields[4].parse().unwrap(),
                ),
            }
        })
        .collect()
}

/// Groups output rows by segment id, keeping file order.
pub fn segments_of(rows: &[OutputRow]) -> BTreeMap<u64, Vec<Point>> {
    let mut segments: BTreeMap<u64, Vec<Point>> = BTreeMap::new();
    for row in rows {
        segments.entry(row.id).or_default().push(row.point);
    }
    segments
}

pub fn verify_output(name: &str, data: &[u8]) {
    let hash_table_path = "tests/output_hashes.lock";
    let mut hash_table: BTreeMap<String, String> = if Path::new(hash_table_path).exists() {
        let hash_table_content =
            fs::read_to_string(hash_table_path).expect("Failed to read hash table file");
        serde_json::from_str(&hash_table_content).unwrap_or_else(|_| BTreeMap::new())
    } else {
        BTreeMap::new()
    };

    let mut hasher = Sha256::new();
    hasher.update(data);
    let current_hash = format!("{:x}", hasher.finalize());

    if let Some(stored_hash) = hash_table.get(name) {
        assert_eq!(
            &current_hash, stored_hash,
            "Output hash mismatch for {name}. Expected: {stored_hash}, Got: {current_hash}. If the output changed on purpose, please delete the output_hashes.lock file and re-run the tests."
        );
        println!("Verified output hash for: {name}");
    } else {
        hash_table.insert(name.to_string(), current_hash.clone());
        let hash_table_content =
            serde_json::to_string_pretty(&hash_table).expect("Failed to serialize hash table");
        fs::write(hash_table_path, hash_table_content).expect("Failed to write hash table file");
        println!("Added new hash entry for: {name}");
    }
}
