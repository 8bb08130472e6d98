//! Scoring and classification: dissimilarity against the window, then phase/verdict.

mod dissimilarity;
mod phase;

pub use dissimilarity::{BestMatch, Comparison, DissimilarityEngine, WeightingMode};
pub use phase::{ClassificationRecord, Decision, Phase, PhaseMachine, RetrainCounter, Verdict};
