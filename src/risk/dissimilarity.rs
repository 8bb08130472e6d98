//! Dissimilarity between a candidate day and each profile in a user's window.
//!
//! Per action type the pair contributes to a distance and to its upper bound
//! (the limit): an action present on one side only adds its weighted count to
//! both; an action present on both sides adds the absolute difference to the
//! distance and the larger value to the limit. The entry score is
//! `distance / limit` in `[0, 1]`; the best match is the minimum over the
//! distinct entries of the window.

use crate::error::{DetectorError, Result};
use crate::features::{ActionFrequency, DailyProfile};
use crate::model::Window;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How action counts are weighted before comparison. Mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMode {
    /// Raw counts
    #[default]
    None,
    /// Counts scaled by the live inverse user frequency of each action type
    Idf,
    /// Counts divided by each profile's own total
    Normalized,
}

impl WeightingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightingMode::None => "none",
            WeightingMode::Idf => "idf",
            WeightingMode::Normalized => "normalized",
        }
    }
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingMode {
    type Err = DetectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(WeightingMode::None),
            "idf" => Ok(WeightingMode::Idf),
            "normalized" => Ok(WeightingMode::Normalized),
            other => Err(DetectorError::InvalidConfig(format!(
                "unknown weighting mode {:?} (expected none, idf or normalized)",
                other
            ))),
        }
    }
}

/// Distance and limit accumulated for one (candidate, entry) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub distance: f64,
    pub limit: f64,
}

impl Comparison {
    pub fn score(&self) -> f64 {
        self.distance / self.limit
    }
}

/// Closest window entry for a candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'w> {
    pub score: f64,
    pub distance: f64,
    pub limit: f64,
    pub profile: &'w DailyProfile,
    /// Distinct entries scored before the search stopped
    pub compared: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DissimilarityEngine {
    mode: WeightingMode,
}

impl DissimilarityEngine {
    pub fn new(mode: WeightingMode) -> Self {
        Self { mode }
    }

    /// Best (minimum) score of `candidate` against `window`; `None` when the window is empty.
    /// Stops at the first exact match.
    pub fn score<'w>(
        &self,
        candidate: &DailyProfile,
        window: &'w Window,
        frequency: &ActionFrequency,
    ) -> Result<Option<BestMatch<'w>>> {
        let mut seen: HashSet<&DailyProfile> = HashSet::new();
        let mut best: Option<BestMatch<'w>> = None;
        let mut compared = 0;

        for entry in window.iter() {
            if !seen.insert(entry) {
                continue;
            }
            compared += 1;
            let cmp = self.compare(candidate, entry, frequency)?;
            let score = cmp.score();
            if best.map_or(true, |b| score < b.score) {
                best = Some(BestMatch {
                    score,
                    distance: cmp.distance,
                    limit: cmp.limit,
                    profile: entry,
                    compared,
                });
            }
            if score == 0.0 {
                break;
            }
        }

        Ok(best.map(|b| BestMatch { compared, ..b }))
    }

    /// Distance and limit between two profiles under the configured weighting.
    pub fn compare(
        &self,
        candidate: &DailyProfile,
        entry: &DailyProfile,
        frequency: &ActionFrequency,
    ) -> Result<Comparison> {
        let (norm_candidate, norm_entry) = match self.mode {
            WeightingMode::Normalized => (candidate.total() as f64, entry.total() as f64),
            _ => (1.0, 1.0),
        };

        let mut distance = 0.0;
        let mut limit = 0.0;

        for (action, count) in candidate.iter() {
            let idf = self.idf(action, frequency);
            let c = count as f64 * idf / norm_candidate;
            match entry.count(action) {
                Some(known) => {
                    let k = known as f64 * idf / norm_entry;
                    distance += (c - k).abs();
                    limit += c.max(k);
                }
                None => {
                    distance += c;
                    limit += c;
                }
            }
        }
        for (action, known) in entry.iter() {
            if candidate.contains(action) {
                continue;
            }
            let k = known as f64 * self.idf(action, frequency) / norm_entry;
            distance += k;
            limit += k;
        }

        if limit == 0.0 {
            return Err(DetectorError::EmptyProfile);
        }
        Ok(Comparison { distance, limit })
    }

    fn idf(&self, action: &str, frequency: &ActionFrequency) -> f64 {
        match self.mode {
            WeightingMode::Idf => frequency.idf(action),
            _ => 1.0,
        }
    }
}
