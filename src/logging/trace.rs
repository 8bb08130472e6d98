//! Human-readable per-user score trace for debugging thresholds.

use crate::features::DailyProfile;
use crate::risk::{Phase, Verdict};
use crate::source::GroundTruth;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Write;

/// Count vectors are printed for days this close to a labeled switch.
const SWITCH_CONTEXT_DAYS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub day: NaiveDate,
    pub score: Option<f64>,
    pub distance: Option<f64>,
    pub limit: Option<f64>,
    pub phase: Phase,
    pub verdict: Verdict,
    pub matched: Option<DailyProfile>,
    pub candidate: DailyProfile,
}

/// Per-user trace buffers, sorted by user id
pub type Traces = BTreeMap<String, Vec<TraceEntry>>;

pub struct TraceWriter<'a> {
    min_days: usize,
    truth: Option<&'a GroundTruth>,
}

impl<'a> TraceWriter<'a> {
    pub fn new(min_days: usize, truth: Option<&'a GroundTruth>) -> Self {
        Self { min_days, truth }
    }

    /// Users with `min_days` or fewer closed days are skipped. Returns users written.
    pub fn write(&self, traces: &Traces, w: &mut impl Write) -> std::io::Result<usize> {
        let mut written = 0;
        for (user_id, entries) in traces {
            if entries.len() <= self.min_days {
                continue;
            }
            writeln!(w)?;
            writeln!(w, "{}", user_id)?;
            let switch = self.truth.and_then(|t| t.switch_day(user_id));
            for entry in entries {
                self.write_entry(entry, switch, w)?;
            }
            written += 1;
        }
        Ok(written)
    }

    fn write_entry(
        &self,
        entry: &TraceEntry,
        switch: Option<NaiveDate>,
        w: &mut impl Write,
    ) -> std::io::Result<()> {
        let mut markers = String::new();
        if switch.is_some_and(|s| s <= entry.day) {
            markers.push_str(" Changed user!");
        }
        if entry.verdict == Verdict::Anomalous {
            markers.push_str(" Detected!");
        }
        match (entry.score, entry.distance, entry.limit) {
            (Some(score), Some(distance), Some(limit)) => writeln!(
                w,
                "{}: {:.4}/{:.4} #{:.2}{} [{}, {}]",
                entry.day, distance, limit, score, markers, entry.phase, entry.verdict
            )?,
            _ => writeln!(
                w,
                "{}: no baseline{} [{}, {}]",
                entry.day, markers, entry.phase, entry.verdict
            )?,
        }
        let near_switch =
            switch.is_some_and(|s| (entry.day - s).num_days().abs() < SWITCH_CONTEXT_DAYS);
        if near_switch {
            if let Some(matched) = &entry.matched {
                writeln!(w, "{}", matched)?;
                writeln!(w, "{}", entry.candidate)?;
            }
        }
        Ok(())
    }
}
