//! Ground truth: `uid,epoch_seconds` per switched user.

use crate::error::{DetectorError, Result};
use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    switches: BTreeMap<String, NaiveDate>,
}

impl GroundTruth {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut switches = BTreeMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |reason: String| DetectorError::MalformedLabel {
                line: line_no,
                reason,
            };
            let (uid, ts) = line
                .split_once(',')
                .ok_or_else(|| malformed("expected `uid,timestamp`".to_string()))?;
            let secs: f64 = ts
                .trim()
                .parse()
                .map_err(|_| malformed(format!("bad timestamp {:?}", ts.trim())))?;
            // Only the switch day matters; the time of day is dropped.
            let day = DateTime::from_timestamp(secs.trunc() as i64, 0)
                .ok_or_else(|| malformed(format!("timestamp out of range: {}", secs)))?
                .date_naive();
            switches.insert(uid.trim().to_string(), day);
        }
        Ok(Self { switches })
    }

    pub fn switch_day(&self, user_id: &str) -> Option<NaiveDate> {
        self.switches.get(user_id).copied()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.switches.contains_key(user_id)
    }

    /// Sorted by user id
    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.switches.iter().map(|(u, d)| (u.as_str(), *d))
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

impl FromIterator<(String, NaiveDate)> for GroundTruth {
    fn from_iter<T: IntoIterator<Item = (String, NaiveDate)>>(iter: T) -> Self {
        Self {
            switches: iter.into_iter().collect(),
        }
    }
}
