//! Fingerprint detector - per-user daily behavioral fingerprints and masquerade detection.
//!
//! Modular structure:
//! - [`source`] - NDJSON event reader and ground-truth labels
//! - [`features`] - Daily action count profiles and online action frequencies
//! - [`model`] - Bounded per-user window of past profiles
//! - [`risk`] - Dissimilarity scoring and the training/detection phase machine
//! - [`detector`] - Daily aggregation and per-user state
//! - [`eval`] - Confusion counts against labeled switches
//! - [`logging`] - Structured logging and the diagnostic score trace

pub mod config;
pub mod detector;
pub mod error;
pub mod eval;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod source;

pub use config::DetectorConfig;
pub use detector::{Detector, Finished};
pub use error::{DetectorError, Result};
pub use eval::Evaluation;
pub use features::{ActionFrequency, DailyProfile};
pub use logging::StructuredLogger;
pub use model::{Window, WindowCapacity};
pub use risk::{ClassificationRecord, DissimilarityEngine, Phase, PhaseMachine, Verdict, WeightingMode};
pub use source::{Event, EventReader, GroundTruth};
