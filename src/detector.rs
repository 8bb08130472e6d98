//! Daily aggregation and per-user state: folds events into daily profiles and,
//! whenever a user's day rolls over, scores and classifies the closed day.

use crate::config::DetectionConfig;
use crate::error::{DetectorError, Result};
use crate::features::{ActionFrequency, DailyProfile};
use crate::logging::{TraceEntry, Traces};
use crate::model::Window;
use crate::risk::{ClassificationRecord, DissimilarityEngine, Phase, PhaseMachine, RetrainCounter, Verdict};
use crate::source::Event;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Everything the detector keeps for one user
#[derive(Debug, Clone)]
pub struct UserState {
    pub current_day: NaiveDate,
    /// Profile of `current_day`, still accumulating
    pub open: DailyProfile,
    pub window: Window,
    pub counter: RetrainCounter,
}

/// End-of-stream output
#[derive(Debug, Default)]
pub struct Finished {
    /// Records for trailing open days, in user-id order (empty unless flushing)
    pub flushed: Vec<ClassificationRecord>,
    pub traces: Traces,
    pub users: usize,
}

pub struct Detector {
    config: DetectionConfig,
    engine: DissimilarityEngine,
    machine: PhaseMachine,
    frequency: ActionFrequency,
    users: HashMap<String, UserState>,
    traces: Option<Traces>,
}

impl Detector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            engine: DissimilarityEngine::new(config.weighting),
            machine: PhaseMachine::from_config(&config),
            config,
            frequency: ActionFrequency::new(),
            users: HashMap::new(),
            traces: None,
        }
    }

    /// Buffer a score trace entry per closed day
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.traces = enabled.then(Traces::new);
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn user(&self, user_id: &str) -> Option<&UserState> {
        self.users.get(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn frequency(&self) -> &ActionFrequency {
        &self.frequency
    }

    /// Consume one event. Events of a user must arrive in non-decreasing day order;
    /// an earlier day is rejected without touching any state.
    /// Returns the record of the day this event closed, if any.
    pub fn observe(&mut self, event: &Event) -> Result<Option<ClassificationRecord>> {
        let day = event.day();
        match self.users.get(&event.user_id) {
            Some(state) if day < state.current_day => {
                return Err(DetectorError::OutOfOrder {
                    user_id: event.user_id.clone(),
                    day,
                    current_day: state.current_day,
                });
            }
            Some(_) => {}
            None => {
                self.frequency.record(&event.user_id, &event.action);
                let mut open = DailyProfile::new();
                open.record(&event.action);
                self.users.insert(
                    event.user_id.clone(),
                    UserState {
                        current_day: day,
                        open,
                        window: Window::new(self.config.window_capacity)
                            .with_eviction(self.config.eviction()),
                        counter: self.machine.initial_counter(),
                    },
                );
                return Ok(None);
            }
        }

        // Counted before scoring: the triggering event is part of the live statistics.
        self.frequency.record(&event.user_id, &event.action);

        let Some(state) = self.users.get_mut(&event.user_id) else {
            return Ok(None);
        };

        let mut record = None;
        if day != state.current_day {
            let closed = std::mem::take(&mut state.open);
            let closed_day = state.current_day;
            state.current_day = day;
            record = Some(close_day(
                &self.engine,
                &self.machine,
                &self.frequency,
                self.traces.as_mut(),
                &event.user_id,
                state,
                closed_day,
                closed,
            )?);
        }
        state.open.record(&event.action);
        Ok(record)
    }

    /// End of stream. Trailing open days are classified when `flush_open_days` is set,
    /// discarded otherwise.
    pub fn finish(mut self) -> Result<Finished> {
        let mut flushed = Vec::new();
        if self.config.flush_open_days {
            let mut user_ids: Vec<String> = self.users.keys().cloned().collect();
            user_ids.sort();
            for user_id in user_ids {
                let Some(state) = self.users.get_mut(&user_id) else {
                    continue;
                };
                if state.open.is_empty() {
                    continue;
                }
                let closed = std::mem::take(&mut state.open);
                let closed_day = state.current_day;
                flushed.push(close_day(
                    &self.engine,
                    &self.machine,
                    &self.frequency,
                    self.traces.as_mut(),
                    &user_id,
                    state,
                    closed_day,
                    closed,
                )?);
            }
        }
        Ok(Finished {
            flushed,
            traces: self.traces.unwrap_or_default(),
            users: self.users.len(),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn close_day(
    engine: &DissimilarityEngine,
    machine: &PhaseMachine,
    frequency: &ActionFrequency,
    traces: Option<&mut Traces>,
    user_id: &str,
    state: &mut UserState,
    day: NaiveDate,
    closed: DailyProfile,
) -> Result<ClassificationRecord> {
    let best = engine.score(&closed, &state.window, frequency)?;
    let decision = machine.step(&mut state.counter, best.map(|b| b.score));

    if let Some(traces) = traces {
        traces.entry(user_id.to_string()).or_default().push(TraceEntry {
            day,
            score: best.map(|b| b.score),
            distance: best.map(|b| b.distance),
            limit: best.map(|b| b.limit),
            phase: decision.phase,
            verdict: decision.verdict,
            matched: best.map(|b| b.profile.clone()),
            candidate: closed.clone(),
        });
    }

    let score = best.map(|b| b.score);
    if decision.phase == Phase::Detection && decision.verdict == Verdict::Anomalous {
        debug!(user_id, %day, score = ?score, "anomalous day detected");
    }

    if decision.memorize {
        state.window.push(closed);
    } else {
        state.window.evict();
    }

    Ok(ClassificationRecord {
        user_id: user_id.to_string(),
        day,
        phase: decision.phase,
        verdict: decision.verdict,
        score,
    })
}
