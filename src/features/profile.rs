//! Daily count vector: how often a user performed each action type on one calendar day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Action type → count. Keys are ordered so every traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyProfile {
    counts: BTreeMap<String, u64>,
}

impl DailyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: &str) {
        match self.counts.get_mut(action) {
            Some(c) => *c += 1,
            None => {
                self.counts.insert(action.to_string(), 1);
            }
        }
    }

    pub fn count(&self, action: &str) -> Option<u64> {
        self.counts.get(action).copied()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.counts.contains_key(action)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct action types
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(a, c)| (a.as_str(), *c))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for DailyProfile {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut counts = BTreeMap::new();
        for (action, count) in iter {
            *counts.entry(action.into()).or_insert(0) += count;
        }
        Self { counts }
    }
}

impl fmt::Display for DailyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (action, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", action, count)?;
        }
        f.write_str("}")
    }
}
