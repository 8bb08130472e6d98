//! Structured logging and the diagnostic score trace.

mod format;
mod trace;

pub use format::StructuredLogger;
pub use trace::{TraceEntry, TraceWriter, Traces};
