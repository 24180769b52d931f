//! Structured logging setup and ndjson assessment lines.

mod format;

pub use format::{AssessmentLogLine, StructuredLogger};
