//! Post-hoc evaluation of classification records against labeled user switches.

mod metrics;

pub use metrics::{Evaluation, UserTally};
