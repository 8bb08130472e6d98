//! Behavioral features: per-day action count vectors and corpus-wide action frequencies.

mod frequency;
mod profile;

pub use frequency::ActionFrequency;
pub use profile::DailyProfile;
