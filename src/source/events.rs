//! NDJSON event reader: one `{"uid", "type", "time"}` object per line.

use super::Event;
use crate::error::{DetectorError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::io::BufRead;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Deserialize)]
struct RawEvent {
    uid: String,
    #[serde(rename = "type")]
    action: String,
    time: String,
}

/// Parse an ISO-8601 timestamp, keeping its offset. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.and_utc().into());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc().into())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Lines read, blank ones included
    pub lines: u64,
    pub events: u64,
    pub rejected: u64,
}

/// Yields one `Result<Event>` per non-blank line; a bad line does not stop the stream.
pub struct EventReader<R> {
    reader: R,
    buf: String,
    stats: SourceStats,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            stats: SourceStats::default(),
        }
    }

    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    fn parse_line(line: &str, line_no: usize) -> Result<Event> {
        let raw: RawEvent =
            serde_json::from_str(line).map_err(|e| DetectorError::MalformedEvent {
                line: line_no,
                reason: e.to_string(),
            })?;
        let ts = parse_timestamp(&raw.time).ok_or_else(|| DetectorError::MalformedEvent {
            line: line_no,
            reason: format!("unparsable timestamp {:?}", raw.time),
        })?;
        Ok(Event::new(raw.uid, raw.action, ts))
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.stats.lines += 1;
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = Self::parse_line(line, self.stats.lines as usize);
            match parsed {
                Ok(_) => self.stats.events += 1,
                Err(_) => self.stats.rejected += 1,
            }
            return Some(parsed);
        }
    }
}
