//! Training/detection phase tracking with retraining after anomalies.

use crate::config::DetectionConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Training,
    Detection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomalous,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Training => "training",
            Phase::Detection => "detection",
        }
    }
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Normal => "normal",
            Verdict::Anomalous => "anomalous",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Days left until detection resumes. Goes negative during long normal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrainCounter(i64);

impl RetrainCounter {
    pub fn new(retrain_length: i64) -> Self {
        Self(retrain_length)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn phase(&self) -> Phase {
        if self.0 <= 0 {
            Phase::Detection
        } else {
            Phase::Training
        }
    }
}

/// Outcome of one closed day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub phase: Phase,
    pub verdict: Verdict,
    /// Whether the day's profile enters the window
    pub memorize: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseMachine {
    threshold: f64,
    retrain_length: i64,
    always_update: bool,
}

impl PhaseMachine {
    pub fn new(threshold: f64, retrain_length: i64, always_update: bool) -> Self {
        Self {
            threshold,
            retrain_length,
            always_update,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.threshold, config.retrain_length, config.always_update)
    }

    pub fn initial_counter(&self) -> RetrainCounter {
        RetrainCounter::new(self.retrain_length)
    }

    /// Classify a closed day and advance the counter exactly once.
    /// The phase reflects the counter before this step; no baseline is never anomalous.
    pub fn step(&self, counter: &mut RetrainCounter, best_score: Option<f64>) -> Decision {
        let phase = counter.phase();
        let verdict = match best_score {
            Some(score) if score > self.threshold => Verdict::Anomalous,
            _ => Verdict::Normal,
        };
        match verdict {
            Verdict::Anomalous => counter.0 = self.retrain_length,
            Verdict::Normal => counter.0 -= 1,
        }
        Decision {
            phase,
            verdict,
            memorize: self.always_update || counter.0 >= 0,
        }
    }
}

/// One classified (user, day), consumed by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub user_id: String,
    pub day: NaiveDate,
    pub phase: Phase,
    pub verdict: Verdict,
    /// Best dissimilarity score; `None` without a baseline
    pub score: Option<f64>,
}

impl ClassificationRecord {
    pub fn tags(&self) -> (Phase, Verdict) {
        (self.phase, self.verdict)
    }
}
