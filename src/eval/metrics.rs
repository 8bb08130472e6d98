//! Confusion counts and derived rates.
//!
//! Only the switch day itself is a positive instance. Training-phase days are
//! never false positives or true negatives, but an anomalous training-phase
//! verdict on the switch day still counts toward the adjusted true positives.

use crate::config::DetectionConfig;
use crate::risk::{ClassificationRecord, Phase, Verdict};
use crate::source::GroundTruth;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserTally {
    pub tp_adjusted: u64,
    pub fn_: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub training_days: u64,
    pub detection_days: u64,
    pub tp: u64,
    pub tp_adjusted: u64,
    pub fp: u64,
    pub tn: u64,
    pub fn_: u64,
    /// One entry per labeled user, detected or not
    pub per_user: BTreeMap<String, UserTally>,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "NaN".to_string(), |r| r.to_string())
}

impl Evaluation {
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a ClassificationRecord>,
        truth: &GroundTruth,
    ) -> Self {
        let mut eval = Evaluation {
            per_user: truth
                .iter()
                .map(|(u, _)| (u.to_string(), UserTally::default()))
                .collect(),
            ..Default::default()
        };

        for record in records {
            match record.phase {
                Phase::Training => eval.training_days += 1,
                Phase::Detection => eval.detection_days += 1,
            }
            let on_switch = truth.switch_day(&record.user_id) == Some(record.day);
            if on_switch {
                let tally = eval.per_user.entry(record.user_id.clone()).or_default();
                match record.tags() {
                    (Phase::Detection, Verdict::Anomalous) => {
                        eval.tp += 1;
                        eval.tp_adjusted += 1;
                        tally.tp_adjusted += 1;
                    }
                    (Phase::Training, Verdict::Anomalous) => {
                        eval.tp_adjusted += 1;
                        tally.tp_adjusted += 1;
                    }
                    (_, Verdict::Normal) => {
                        eval.fn_ += 1;
                        tally.fn_ += 1;
                    }
                }
            } else {
                match record.tags() {
                    (Phase::Detection, Verdict::Anomalous) => eval.fp += 1,
                    (Phase::Detection, Verdict::Normal) => eval.tn += 1,
                    (Phase::Training, _) => {}
                }
            }
        }
        eval
    }

    /// Scored instances: TP + TN + FP + FN
    pub fn total(&self) -> u64 {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn tpr_adjusted(&self) -> Option<f64> {
        ratio(self.tp_adjusted as f64, (self.tp_adjusted + self.fn_) as f64)
    }

    /// Recall
    pub fn tpr(&self) -> Option<f64> {
        ratio(self.tp as f64, (self.tp + self.fn_) as f64)
    }

    pub fn fpr(&self) -> Option<f64> {
        ratio(self.fp as f64, (self.fp + self.tn) as f64)
    }

    pub fn tnr(&self) -> Option<f64> {
        ratio(self.tn as f64, (self.tn + self.fp) as f64)
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.tp_adjusted as f64, (self.tp_adjusted + self.fp) as f64)
    }

    pub fn f1(&self) -> Option<f64> {
        let tp = self.tp_adjusted as f64;
        ratio(tp, tp + 0.5 * (self.fp + self.fn_) as f64)
    }

    pub fn accuracy(&self) -> Option<f64> {
        let hits = (self.tp_adjusted + self.tn) as f64;
        ratio(hits, (self.tp_adjusted + self.tn + self.fp + self.fn_) as f64)
    }

    /// Share of classified days spent in training
    pub fn training_ratio(&self) -> Option<f64> {
        ratio(
            self.training_days as f64,
            (self.training_days + self.detection_days) as f64,
        )
    }

    pub fn csv_header() -> &'static str {
        "thresh,retrain,mode,queue,update,total,train,detect,tp_adj,tp,fp,tn,fn,tpr_adj,tpr,fpr,tnr,p,f1,acc"
    }

    pub fn csv_row(&self, config: &DetectionConfig) -> String {
        [
            config.threshold.to_string(),
            config.retrain_length.to_string(),
            config.weighting.to_string(),
            config.window_capacity.to_string(),
            config.always_update.to_string(),
            self.total().to_string(),
            self.training_days.to_string(),
            self.detection_days.to_string(),
            self.tp_adjusted.to_string(),
            self.tp.to_string(),
            self.fp.to_string(),
            self.tn.to_string(),
            self.fn_.to_string(),
            fmt_rate(self.tpr_adjusted()),
            fmt_rate(self.tpr()),
            fmt_rate(self.fpr()),
            fmt_rate(self.tnr()),
            fmt_rate(self.precision()),
            fmt_rate(self.f1()),
            fmt_rate(self.accuracy()),
        ]
        .join(",")
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Total = {}", self.total())?;
        writeln!(f, "  Train = {}", self.training_days)?;
        writeln!(f, "  Detect = {}", self.detection_days)?;
        writeln!(f, "  TP_adj = {}", self.tp_adjusted)?;
        writeln!(f, "  TP = {}", self.tp)?;
        for (user_id, tally) in &self.per_user {
            writeln!(f, " - {}: TP_adj = {}, FN = {}", user_id, tally.tp_adjusted, tally.fn_)?;
        }
        writeln!(f, "  FP = {}", self.fp)?;
        writeln!(f, "  TN = {}", self.tn)?;
        writeln!(f, "  FN = {}", self.fn_)?;
        writeln!(f, "  TPR_adj = {}", fmt_rate(self.tpr_adjusted()))?;
        writeln!(f, "  TPR = Rec = {}", fmt_rate(self.tpr()))?;
        writeln!(f, "  FPR = {}", fmt_rate(self.fpr()))?;
        writeln!(f, "  TNR = {}", fmt_rate(self.tnr()))?;
        writeln!(f, "  Prec = {}", fmt_rate(self.precision()))?;
        writeln!(f, "  F1 = {}", fmt_rate(self.f1()))?;
        writeln!(f, "  ACC = {}", fmt_rate(self.accuracy()))?;
        write!(f, "  R = {}", fmt_rate(self.training_ratio()))
    }
}
