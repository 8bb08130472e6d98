//! FIFO window of past daily profiles, oldest first.

use crate::error::DetectorError;
use crate::features::DailyProfile;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Maximum number of profiles a window retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCapacity {
    Bounded(usize),
    Unlimited,
}

impl WindowCapacity {
    pub fn limit(&self) -> Option<usize> {
        match self {
            WindowCapacity::Bounded(n) => Some(*n),
            WindowCapacity::Unlimited => None,
        }
    }
}

impl fmt::Display for WindowCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowCapacity::Bounded(n) => write!(f, "{}", n),
            WindowCapacity::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl FromStr for WindowCapacity {
    type Err = DetectorError;

    /// Accepts a count, `-1` or `unlimited`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") || s == "-1" {
            return Ok(WindowCapacity::Unlimited);
        }
        s.parse::<usize>()
            .map(WindowCapacity::Bounded)
            .map_err(|_| DetectorError::InvalidConfig(format!("bad window capacity {:?}", s)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCapacity {
    Count(i64),
    Word(String),
}

impl<'de> Deserialize<'de> for WindowCapacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawCapacity::deserialize(deserializer)? {
            RawCapacity::Count(-1) => Ok(WindowCapacity::Unlimited),
            RawCapacity::Count(n) if n >= 0 => Ok(WindowCapacity::Bounded(n as usize)),
            RawCapacity::Count(n) => Err(serde::de::Error::custom(format!(
                "window capacity must be >= 0 or -1, got {}",
                n
            ))),
            RawCapacity::Word(w) => w.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for WindowCapacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WindowCapacity::Bounded(n) => serializer.serialize_u64(*n as u64),
            WindowCapacity::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// When a bounded window drops its oldest entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Eviction {
    /// Keep the newest `capacity` entries.
    #[default]
    KeepNewest,
    /// Drop one entry whenever the length reaches the capacity, so at most
    /// `capacity - 1` entries survive each eviction.
    ShiftWhenFull,
}

/// Entries may repeat by value; scoring deduplicates.
#[derive(Debug, Clone)]
pub struct Window {
    capacity: WindowCapacity,
    eviction: Eviction,
    entries: VecDeque<DailyProfile>,
}

impl Window {
    pub fn new(capacity: WindowCapacity) -> Self {
        Self {
            capacity,
            eviction: Eviction::default(),
            entries: VecDeque::new(),
        }
    }

    pub fn with_eviction(mut self, eviction: Eviction) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn with_entries(capacity: WindowCapacity, entries: impl IntoIterator<Item = DailyProfile>) -> Self {
        let mut window = Self::new(capacity);
        for profile in entries {
            window.push(profile);
        }
        window
    }

    /// Append, then evict under the window's rule.
    pub fn push(&mut self, profile: DailyProfile) {
        self.entries.push_back(profile);
        self.evict();
    }

    /// Drop oldest entries as the eviction rule demands. Returns how many were dropped.
    pub fn evict(&mut self) -> usize {
        let Some(limit) = self.capacity.limit() else {
            return 0;
        };
        let mut dropped = 0;
        match self.eviction {
            Eviction::KeepNewest => {
                while self.entries.len() > limit {
                    self.entries.pop_front();
                    dropped += 1;
                }
            }
            Eviction::ShiftWhenFull => {
                if self.entries.len() >= limit && self.entries.pop_front().is_some() {
                    dropped = 1;
                }
            }
        }
        dropped
    }

    pub fn capacity(&self) -> WindowCapacity {
        self.capacity
    }

    pub fn eviction(&self) -> Eviction {
        self.eviction
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &DailyProfile> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&DailyProfile> {
        self.entries.back()
    }
}
