use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{FixerError, Result};

pub const DEFAULT_SPATIAL_LIMIT: f64 = 0.002;
pub const DEFAULT_TIME_LIMIT: i64 = 30000;
pub const DEFAULT_MIN_BOUNDARY: f64 = 0.01;

/// Which field of a row holds what. Indices are 0-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub field_count: usize,
    pub entity: usize,
    pub lat: usize,
    pub lng: usize,
    pub timestamp: usize,
}

impl ColumnMapping {
    /// `entity_id;lat;lng;timestamp`
    pub const FOUR_FIELDS: ColumnMapping = ColumnMapping {
        field_count: 4,
        entity: 0,
        lat: 1,
        lng: 2,
        timestamp: 3,
    };

    /// `driver_id;entity_id;lat;lng;timestamp`
    pub const FIVE_FIELDS: ColumnMapping = ColumnMapping {
        field_count: 5,
        entity: 1,
        lat: 2,
        lng: 3,
        timestamp: 4,
    };

    pub fn validate(&self) -> Result<()> {
        let indices = [self.entity, self.lat, self.lng, self.timestamp];
        if let Some(i) = indices.iter().find(|i| **i >= self.field_count) {
            return Err(FixerError::Config(format!(
                "column index {} out of range for {} fields",
                i, self.field_count
            )));
        }
        for (n, a) in indices.iter().enumerate() {
            if indices[n + 1..].contains(a) {
                return Err(FixerError::Config(format!(
                    "column index {} is mapped twice",
                    a
                )));
            }
        }
        Ok(())
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping::FOUR_FIELDS
    }
}

/// Named column presets, for the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ColumnLayout {
    Four,
    Five,
}

impl ColumnLayout {
    pub fn mapping(self) -> ColumnMapping {
        match self {
            ColumnLayout::Four => ColumnMapping::FOUR_FIELDS,
            ColumnLayout::Five => ColumnMapping::FIVE_FIELDS,
        }
    }
}

/// What to do with a row that cannot be parsed.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RowPolicy {
    /// Abort the whole run on the first malformed row.
    #[default]
    FailFast,
    /// Log the row at `warn` level and keep going.
    SkipAndLog,
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// `driver_id;id;lat;lng;timestamp`, where `driver_id` is the input entity id.
    #[default]
    WithEntity,
    /// `id;lat;lng;timestamp`
    Simple,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    pub spatial_limit: f64,
    pub time_limit: i64,
    pub min_boundary: f64,
    pub columns: ColumnMapping,
    pub row_policy: RowPolicy,
    pub output_layout: OutputLayout,
}

impl Default for FixerConfig {
    fn default() -> Self {
        FixerConfig {
            spatial_limit: DEFAULT_SPATIAL_LIMIT,
            time_limit: DEFAULT_TIME_LIMIT,
            min_boundary: DEFAULT_MIN_BOUNDARY,
            columns: ColumnMapping::default(),
            row_policy: RowPolicy::default(),
            output_layout: OutputLayout::default(),
        }
    }
}

impl FixerConfig {
    /// Reads a JSON config file. Keys that are not present keep their default.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FixerConfig = serde_json::from_str(&content)
            .map_err(|e| FixerError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.spatial_limit.is_finite() && self.spatial_limit > 0.0) {
            return Err(FixerError::Config(format!(
                "spatial_limit must be a positive number, got {}",
                self.spatial_limit
            )));
        }
        if self.time_limit <= 0 {
            return Err(FixerError::Config(format!(
                "time_limit must be positive, got {}",
                self.time_limit
            )));
        }
        if !(self.min_boundary.is_finite() && self.min_boundary >= 0.0) {
            return Err(FixerError::Config(format!(
                "min_boundary must be a non-negative number, got {}",
                self.min_boundary
            )));
        }
        self.columns.validate()
    }
}
