//! Detector configuration: JSON file with defaults, overridable from the command line.

use crate::error::{DetectorError, Result};
use crate::model::{Eviction, WindowCapacity};
use crate::risk::WeightingMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Scoring and phase parameters
    pub detection: DetectionConfig,
    /// Event stream and ground truth locations
    pub input: InputConfig,
    /// Record, trace and progress output
    pub output: OutputConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Days scoring above this are anomalous
    pub threshold: f64,
    /// Forced training days after an anomaly
    pub retrain_length: i64,
    pub weighting: WeightingMode,
    /// Max past profiles retained per user
    pub window_capacity: WindowCapacity,
    /// Memorize detection-phase days too
    pub always_update: bool,
    /// Classify each user's trailing open day at end of stream
    pub flush_open_days: bool,
    /// Drop the oldest profile whenever the window is full, leaving at most
    /// `window_capacity - 1` entries between days
    pub reference_eviction: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// NDJSON events, one `{"uid", "type", "time"}` object per line
    pub events_path: PathBuf,
    /// `uid,epoch_seconds` switch labels
    pub labels_path: Option<PathBuf>,
    /// Drop events of users absent from the labels
    pub only_labeled_users: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// NDJSON classification records
    pub records_path: Option<PathBuf>,
    /// Human-readable per-user score trace
    pub trace_path: Option<PathBuf>,
    /// Users with at most this many closed days are left out of the trace
    pub trace_min_days: usize,
    /// Log progress every N input lines (0 disables)
    pub progress_every: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            retrain_length: 1,
            weighting: WeightingMode::None,
            window_capacity: WindowCapacity::Bounded(10),
            always_update: false,
            flush_open_days: true,
            reference_eviction: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            events_path: PathBuf::from("events.jsonl"),
            labels_path: None,
            only_labeled_users: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: None,
            trace_path: None,
            trace_min_days: 15,
            progress_every: 1_000_000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DetectionConfig {
    pub fn eviction(&self) -> Eviction {
        if self.reference_eviction {
            Eviction::ShiftWhenFull
        } else {
            Eviction::KeepNewest
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(DetectorError::InvalidConfig(format!(
                "threshold must be a finite non-negative number, got {}",
                self.threshold
            )));
        }
        if self.retrain_length < 0 {
            return Err(DetectorError::InvalidConfig(format!(
                "retrain_length must be >= 0, got {}",
                self.retrain_length
            )));
        }
        if self.window_capacity == WindowCapacity::Bounded(0) {
            return Err(DetectorError::InvalidConfig(
                "window_capacity must be >= 1 or unlimited".to_string(),
            ));
        }
        Ok(())
    }
}

impl DetectorConfig {
    /// Load from JSON file if present; otherwise return default.
    /// A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<DetectorConfig>(&data)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        if self.input.only_labeled_users && self.input.labels_path.is_none() {
            return Err(DetectorError::InvalidConfig(
                "only_labeled_users requires labels_path".to_string(),
            ));
        }
        Ok(())
    }
}
