#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export_data;
pub mod fixer;
pub mod grouper;
pub mod import_data;
pub mod logs;
pub mod progress;
pub mod segmenter;
pub mod statistics;
pub mod trajectory;
pub mod validity;

pub use config::FixerConfig;
pub use error::{FixerError, Result};
pub use fixer::{RunSummary, TrajectoryFixer};
pub use trajectory::{Point, Segment, Trajectory};
